//! Layer registry: class index, class colors and visibility toggles.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::Color;
use crate::config::{ColorConfig, ColorScheme};
use crate::constants::{CLASS_LIGHTNESS, CLASS_SATURATION};
use crate::model::NormalizedObject;

/// Hands out one color per class.
#[derive(Debug, Clone)]
pub struct Palette {
    scheme: ColorScheme,
    rng: StdRng,
}

impl Palette {
    pub fn new(config: &ColorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            scheme: config.scheme,
            rng,
        }
    }

    /// Color for a class seen for the first time in this pass.
    pub fn color_for(&mut self, class: &str) -> Color {
        let hue = match self.scheme {
            ColorScheme::Random => self.rng.gen_range(0.0..360.0),
            ColorScheme::Hashed => (fnv1a(class.as_bytes()) % 360) as f32,
        };
        Color::from_hsl(hue, CLASS_SATURATION, CLASS_LIGHTNESS)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |h, &b| {
        (h ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// All objects of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLayer {
    pub name: String,
    pub color: Color,
    /// Indices into the object list, in payload order.
    pub members: Vec<usize>,
    pub visible: bool,
}

/// Entry of the class toggle list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary {
    pub name: String,
    pub count: usize,
    pub color: Color,
    pub visible: bool,
}

/// Class→object index plus per-class and per-dimension-area visibility.
///
/// Built fresh for every visualized payload; nothing carries over.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    /// In order of first appearance, which is also draw order.
    layers: Vec<ClassLayer>,
    by_name: HashMap<String, usize>,
    dimensions: BTreeMap<i64, bool>,
}

impl LayerRegistry {
    /// Index `objects` by class and give every object its class color.
    pub fn build(objects: &mut [NormalizedObject], palette: &mut Palette) -> Self {
        let mut registry = Self::default();

        for (i, object) in objects.iter_mut().enumerate() {
            let slot = match registry.by_name.get(&object.class) {
                Some(&slot) => slot,
                None => {
                    let slot = registry.layers.len();
                    registry.layers.push(ClassLayer {
                        name: object.class.clone(),
                        color: palette.color_for(&object.class),
                        members: Vec::new(),
                        visible: true,
                    });
                    registry.by_name.insert(object.class.clone(), slot);
                    slot
                }
            };
            let layer = &mut registry.layers[slot];
            layer.members.push(i);
            object.color = layer.color;

            if let Some(idx) = object.crop_index {
                registry.dimensions.insert(idx, true);
            }
        }

        registry
    }

    /// Layers in draw order.
    pub fn layers(&self) -> &[ClassLayer] {
        &self.layers
    }

    pub fn layer(&self, class: &str) -> Option<&ClassLayer> {
        self.by_name.get(class).map(|&slot| &self.layers[slot])
    }

    /// Returns false if the class is not in the current payload.
    pub fn set_class_visible(&mut self, class: &str, visible: bool) -> bool {
        match self.by_name.get(class) {
            Some(&slot) => {
                self.layers[slot].visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn is_class_visible(&self, class: &str) -> bool {
        self.layer(class).is_some_and(|l| l.visible)
    }

    /// Returns false if no object references the dimension area.
    pub fn set_dimension_visible(&mut self, index: i64, visible: bool) -> bool {
        match self.dimensions.get_mut(&index) {
            Some(v) => {
                *v = visible;
                true
            }
            None => false,
        }
    }

    /// Unknown indices count as visible.
    pub fn is_dimension_visible(&self, index: i64) -> bool {
        self.dimensions.get(&index).copied().unwrap_or(true)
    }

    /// Object indices to draw, in draw order.
    pub fn visible_objects(&self) -> impl Iterator<Item = usize> + '_ {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.members.iter().copied())
    }

    /// Classes sorted by name with their object counts.
    pub fn class_summaries(&self) -> Vec<ClassSummary> {
        let mut out: Vec<ClassSummary> = self
            .layers
            .iter()
            .map(|l| ClassSummary {
                name: l.name.clone(),
                count: l.members.len(),
                color: l.color,
                visible: l.visible,
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Dimension-area indices referenced by the payload, ascending.
    pub fn dimension_indices(&self) -> Vec<i64> {
        self.dimensions.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::ObjectKind;

    fn object(class: &str) -> NormalizedObject {
        NormalizedObject::new(class, ObjectKind::Polygon, vec![Point::new(0.0, 0.0)])
    }

    fn seeded() -> Palette {
        Palette::new(&ColorConfig {
            scheme: ColorScheme::Random,
            seed: Some(7),
        })
    }

    #[test]
    fn test_one_color_per_class() {
        let mut objects = vec![object("wall"), object("door"), object("wall")];
        let registry = LayerRegistry::build(&mut objects, &mut seeded());

        assert_eq!(objects[0].color, objects[2].color);
        assert_eq!(registry.layer("wall").unwrap().members, vec![0, 2]);
        assert_eq!(registry.layers()[0].name, "wall");
    }

    #[test]
    fn test_class_colors_use_fixed_saturation_and_lightness() {
        let mut palette = seeded();
        for _ in 0..20 {
            let c = palette.color_for("x");
            let max = c.r.max(c.g).max(c.b);
            let min = c.r.min(c.g).min(c.b);
            // l = (max + min) / 2, s = (max - min) / (1 - |2l - 1|)
            assert!(((max + min) / 2.0 - 0.5).abs() < 0.01);
            assert!(((max - min) - 0.7).abs() < 0.01);
        }
    }

    #[test]
    fn test_hashed_scheme_is_deterministic() {
        let config = ColorConfig {
            scheme: ColorScheme::Hashed,
            seed: None,
        };
        let a = Palette::new(&config).color_for("Wall");
        let b = Palette::new(&config).color_for("Wall");
        assert_eq!(a, b);
    }

    #[test]
    fn test_visibility_toggles() {
        let mut objects = vec![object("wall"), object("door"), object("wall")];
        let mut registry = LayerRegistry::build(&mut objects, &mut seeded());

        assert!(registry.set_class_visible("wall", false));
        assert!(!registry.set_class_visible("window", false));
        assert!(!registry.is_class_visible("wall"));
        assert_eq!(registry.visible_objects().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_dimension_indices() {
        let mut a = object("dim_ocr");
        a.crop_index = Some(5);
        let mut b = object("dim_ocr");
        b.crop_index = Some(2);
        let mut objects = vec![a, b];
        let mut registry = LayerRegistry::build(&mut objects, &mut seeded());

        assert_eq!(registry.dimension_indices(), vec![2, 5]);
        assert!(registry.set_dimension_visible(5, false));
        assert!(!registry.is_dimension_visible(5));
        assert!(registry.is_dimension_visible(2));
        assert!(!registry.set_dimension_visible(9, false));
    }

    #[test]
    fn test_summaries_sorted_with_counts() {
        let mut objects = vec![object("wall"), object("door"), object("wall")];
        let registry = LayerRegistry::build(&mut objects, &mut seeded());
        let summaries = registry.class_summaries();

        assert_eq!(summaries[0].name, "door");
        assert_eq!(summaries[0].count, 1);
        assert_eq!(summaries[1].count, 2);
    }
}
