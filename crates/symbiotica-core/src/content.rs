//! Page content as plain text.

use symbiotica_notion::Block;

/// Render blocks one per line, skipping blocks without text.
pub fn render_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(Block::render_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(value: serde_json::Value) -> Block {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_render_blocks() {
        let blocks = vec![
            block(json!({
                "id": "b1",
                "type": "heading_2",
                "heading_2": {"rich_text": [{"plain_text": "Notes"}]}
            })),
            block(json!({
                "id": "b2",
                "type": "paragraph",
                "paragraph": {"rich_text": []}
            })),
            block(json!({
                "id": "b3",
                "type": "bulleted_list_item",
                "bulleted_list_item": {"rich_text": [
                    {"plain_text": "first "},
                    {"plain_text": "point"}
                ]}
            })),
        ];

        assert_eq!(render_blocks(&blocks), "## Notes\n- first point");
    }

    #[test]
    fn test_render_no_blocks() {
        assert_eq!(render_blocks(&[]), "");
    }
}
