//! Preset starting worlds
//!
//! Every scene is sized against the world's arena, and the random one is
//! driven by a seeded RNG so the same seed always yields the same shapes.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::shape::{ShapeDef, ShapeError, ShapeId};
use super::world::World;

const RAIN_MIN_RADIUS: f32 = 5.0;
const RAIN_MAX_RADIUS: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Two small circles side by side near the floor
    Pair,
    /// A circle dropping onto a fixed platform
    Platform,
    /// Four large fixed circles forming a bowl, with a circle inside
    Bowl,
    /// Randomly scattered circles
    Rain { count: u32, seed: u64 },
}

impl Scene {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Pair => "pair",
            Scene::Platform => "platform",
            Scene::Bowl => "bowl",
            Scene::Rain { .. } => "rain",
        }
    }

    /// Parse a scene name; `rain` uses 40 circles and seed 1
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pair" => Some(Scene::Pair),
            "platform" => Some(Scene::Platform),
            "bowl" => Some(Scene::Bowl),
            "rain" => Some(Scene::Rain { count: 40, seed: 1 }),
            _ => None,
        }
    }

    /// Insert the scene's shapes, returning their ids in insertion order
    pub fn populate(&self, world: &mut World) -> Result<Vec<ShapeId>, ShapeError> {
        let arena = world.arena();
        let (w, h) = (arena.width, arena.height);
        let (cx, cy) = (w / 2.0, h / 2.0);

        let defs = match *self {
            Scene::Pair => vec![
                ShapeDef::circle(cx - 10.0, h * 0.9, 10.0).name("S1"),
                ShapeDef::circle(cx + 10.0, h * 0.9, 10.0).name("S2"),
            ],
            Scene::Platform => vec![
                ShapeDef::rectangle(w * 0.1, h * 0.7, w * 0.8, h * 0.1)
                    .fixed()
                    .name("Fix"),
                ShapeDef::circle(cx, h * 0.48, 25.0).name("Ball"),
            ],
            Scene::Bowl => {
                let r = w / 2.0;
                vec![
                    ShapeDef::circle(cx, h + r * 0.6, r).fixed().name("S"),
                    ShapeDef::circle(cx, -r * 0.6, r).fixed().name("N"),
                    ShapeDef::circle(-r * 0.6, cy, r).fixed().name("W"),
                    ShapeDef::circle(w + r * 0.6, cy, r).fixed().name("E"),
                    ShapeDef::circle(cx, cy - 10.0, 25.0).name("Ball"),
                ]
            }
            Scene::Rain { count, seed } => {
                let mut rng = Pcg32::seed_from_u64(seed);
                // Radii shrink so every drop fits across the arena and in its top half
                let max_radius = RAIN_MAX_RADIUS.min(w * 0.5).min(h * 0.25);
                let min_radius = RAIN_MIN_RADIUS.min(max_radius * 0.5);
                (0..count)
                    .map(|i| {
                        let radius = rng.random_range(min_radius..=max_radius);
                        let x = rng.random_range(radius..=w - radius);
                        let y = rng.random_range(radius..=h * 0.5);
                        ShapeDef::circle(x, y, radius).name(format!("R{i}"))
                    })
                    .collect()
            }
        };

        let ids = defs
            .into_iter()
            .map(|def| world.insert_shape(def))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("Scene {}: {} shapes", self.as_str(), ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NullSurface;
    use crate::settings::WorldSettings;
    use crate::sim::{Arena, ShapeKind};

    #[test]
    fn test_from_name() {
        assert_eq!(Scene::from_name("Platform"), Some(Scene::Platform));
        assert!(matches!(Scene::from_name("rain"), Some(Scene::Rain { count: 40, .. })));
        assert_eq!(Scene::from_name("sat"), None);
    }

    #[test]
    fn test_platform_matches_default_arena() {
        let mut world = World::default();
        let ids = Scene::Platform.populate(&mut world).unwrap();
        let platform = world.shape(ids[0]).unwrap();
        assert!(platform.is_fixed());
        assert!(platform.position().distance(glam::Vec2::new(50.0, 350.0)) < 1e-3);
        assert_eq!(platform.name(), "Fix");
    }

    #[test]
    fn test_rain_is_reproducible() {
        let scene = Scene::Rain { count: 25, seed: 7 };
        let mut a = World::default();
        let mut b = World::default();
        scene.populate(&mut a).unwrap();
        scene.populate(&mut b).unwrap();

        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.shapes().len(), 25);

        let mut c = World::default();
        Scene::Rain { count: 25, seed: 8 }.populate(&mut c).unwrap();
        assert_ne!(a.snapshot(), c.snapshot());
    }

    #[test]
    fn test_rain_fits_small_arena() {
        let settings = WorldSettings {
            arena: Arena::new(20.0, 20.0),
            ..Default::default()
        };
        let mut world = World::new(settings).unwrap();
        let ids = Scene::Rain { count: 3, seed: 1 }.populate(&mut world).unwrap();
        assert_eq!(ids.len(), 3);

        for shape in world.shapes() {
            let ShapeKind::Circle { radius } = shape.kind else {
                panic!("rain only makes circles");
            };
            let p = shape.position();
            assert!(radius > 0.0 && radius <= 5.0);
            assert!(p.x >= radius && p.x <= 20.0 - radius);
            assert!(p.y >= radius && p.y <= 10.0);
        }
    }

    #[test]
    fn test_bowl_keeps_ball_inside() {
        let mut world = World::default();
        let ids = Scene::Bowl.populate(&mut world).unwrap();
        for _ in 0..500 {
            world.step(0.02, &mut NullSurface);
        }
        let ball = world.shape(ids[4]).unwrap().position();
        assert!(ball.is_finite());
        assert!(ball.x > 0.0 && ball.x < 500.0 && ball.y > 0.0 && ball.y < 500.0);
    }
}
