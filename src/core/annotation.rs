// On-screen label overlay for a classified frame

use crate::models::pose::PoseLabel;
use serde::{Deserialize, Serialize};

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];

const TEXT_ORIGIN: (i32, i32) = (10, 30);
const TEXT_THICKNESS: u32 = 2;
const OUTLINE_LAYERS: i32 = 3;

/// One pass of text drawing: the display layer paints these in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLayer {
    pub origin: (i32, i32),
    pub color: [u8; 3],
    pub thickness: u32,
}

/// Label text plus the layers that give it a dark outline, so it reads on
/// any background
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub layers: Vec<TextLayer>,
}

impl Annotation {
    pub fn for_label(label: Option<PoseLabel>) -> Self {
        let text = label
            .map(|l| l.as_str())
            .unwrap_or(PoseLabel::UNKNOWN_TEXT)
            .to_string();

        let (x, y) = TEXT_ORIGIN;
        let mut layers: Vec<TextLayer> = (0..OUTLINE_LAYERS)
            .map(|i| TextLayer {
                origin: (x - i, y - i),
                color: BLACK,
                thickness: TEXT_THICKNESS + i as u32,
            })
            .collect();

        layers.push(TextLayer {
            origin: TEXT_ORIGIN,
            color: WHITE,
            thickness: TEXT_THICKNESS,
        });

        Self { text, layers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text() {
        assert_eq!(Annotation::for_label(Some(PoseLabel::HandsUp)).text, "Hands Up");
        assert_eq!(Annotation::for_label(None).text, "Unknown Pose");
    }

    #[test]
    fn test_outline_drawn_before_text() {
        let annotation = Annotation::for_label(Some(PoseLabel::TPose));
        assert_eq!(annotation.layers.len(), 4);

        let outline = &annotation.layers[..3];
        assert!(outline.iter().all(|layer| layer.color == BLACK));
        assert_eq!(outline[0].origin, (10, 30));
        assert_eq!(outline[2].origin, (8, 28));
        assert_eq!(outline[2].thickness, 4);

        let text = annotation.layers.last().unwrap();
        assert_eq!(text.color, WHITE);
        assert_eq!(text.origin, (10, 30));
        assert_eq!(text.thickness, 2);
    }
}
