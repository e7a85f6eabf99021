//! Level generator
//!
//! Draws a random obstacle sequence and lays the course out along -Z:
//! Start, the drawn obstacles, End, then the bounds around all of it.
//!
//! Both the sequence and the bounds are memoized on their inputs. Rendering
//! the same level twice never redraws anything; only new parameters do.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::blocks::{Block, BlockKind};
use super::bounds::Bounds;
use super::memo::Memo;
use super::physics::{BodyHandle, PhysicsWorld};
use super::scene::{BodyNode, Group, Scene};
use crate::consts::DEFAULT_OBSTACLE_COUNT;
use crate::segment_z;

/// Generation parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    /// Number of random obstacle segments
    pub count: usize,
    /// Pool the obstacles are drawn from (with replacement)
    pub types: Vec<BlockKind>,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_OBSTACLE_COUNT,
            types: BlockKind::OBSTACLES.to_vec(),
        }
    }
}

impl LevelParams {
    pub fn new(count: usize, types: Vec<BlockKind>) -> Self {
        Self { count, types }
    }

    /// Obstacles + start + end
    pub fn total_length(&self) -> usize {
        self.count + 2
    }
}

/// Draw `count` kinds uniformly from `types`, repeats allowed.
///
/// # Panics
///
/// If `count > 0` and `types` is empty.
pub fn draw_sequence<R: Rng + ?Sized>(count: usize, types: &[BlockKind], rng: &mut R) -> Vec<BlockKind> {
    assert!(
        count == 0 || !types.is_empty(),
        "cannot draw {count} obstacles from an empty type set"
    );
    (0..count)
        .map(|_| types[rng.random_range(0..types.len())])
        .collect()
}

/// A generated course and the instances living on it
#[derive(Debug, Clone)]
pub struct Level {
    seed: u64,
    params: LevelParams,
    rng: Pcg32,
    sequence: Memo<LevelParams, Vec<BlockKind>>,
    bounds: Memo<usize, Bounds>,
    start: Block,
    obstacles: Vec<Block>,
    end: Block,
    /// Bounds length currently registered with the world and its bodies
    mounted_bounds: Option<(usize, Vec<BodyHandle>)>,
    /// Bodies to remove on the next sync
    retired: Vec<BodyHandle>,
}

impl Level {
    /// New level seeded from OS entropy
    pub fn new(params: LevelParams) -> Self {
        Self::with_seed(params, rand::random())
    }

    /// Reproducible level: equal seeds and params give equal courses,
    /// including every obstacle's speed or phase
    pub fn with_seed(params: LevelParams, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let start = Block::build(BlockKind::Start, Vec3::ZERO, &mut rng);
        let end = Block::build(BlockKind::End, end_position(&params), &mut rng);

        let mut level = Self {
            seed,
            params,
            rng,
            sequence: Memo::new(),
            bounds: Memo::new(),
            start,
            obstacles: Vec::new(),
            end,
            mounted_bounds: None,
            retired: Vec::new(),
        };
        level.regenerate();
        level
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &LevelParams {
        &self.params
    }

    /// Change generation parameters.
    ///
    /// Equal parameters are a no-op. Otherwise a fresh sequence is drawn;
    /// obstacle instances whose slot keeps the same kind survive with their
    /// first-drawn speed/phase and body.
    pub fn set_params(&mut self, params: LevelParams) {
        if params == self.params {
            log::debug!("Level params unchanged, keeping sequence");
            return;
        }
        self.params = params;
        self.regenerate();
    }

    pub fn set_count(&mut self, count: usize) {
        let params = LevelParams {
            count,
            ..self.params.clone()
        };
        self.set_params(params);
    }

    fn regenerate(&mut self) {
        let rng = &mut self.rng;
        let sequence = self
            .sequence
            .get_or_compute(&self.params, |p| draw_sequence(p.count, &p.types, rng))
            .clone();

        log::info!(
            "Level (seed {}): {} obstacles [{}]",
            self.seed,
            sequence.len(),
            sequence.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
        );

        let mut previous = std::mem::take(&mut self.obstacles).into_iter();
        let mut obstacles = Vec::with_capacity(sequence.len());
        for (i, &kind) in sequence.iter().enumerate() {
            match previous.next() {
                Some(block) if block.kind == kind => {
                    log::debug!("Slot {} keeps its {}", i + 1, kind.as_str());
                    obstacles.push(block);
                }
                stale => {
                    if let Some(mut block) = stale {
                        self.retired.extend(block.take_handles());
                    }
                    let position = Vec3::new(0.0, 0.0, segment_z(i + 1));
                    obstacles.push(Block::build(kind, position, &mut self.rng));
                }
            }
        }
        for mut block in previous {
            self.retired.extend(block.take_handles());
        }
        self.obstacles = obstacles;

        let end_pos = end_position(&self.params);
        if self.end.position != end_pos {
            self.retired.extend(self.end.take_handles());
            self.end = Block::build(BlockKind::End, end_pos, &mut self.rng);
        }

        let length = self.params.total_length();
        self.bounds.get_or_compute(&length, |&l| Bounds::generate(l));
    }

    /// Obstacle kinds in course order
    pub fn sequence(&self) -> Vec<BlockKind> {
        self.obstacles.iter().map(|b| b.kind).collect()
    }

    /// Every block in scene order: Start, obstacles, End
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(&self.start)
            .chain(self.obstacles.iter())
            .chain(std::iter::once(&self.end))
    }

    fn blocks_mut(&mut self) -> impl Iterator<Item = &mut Block> {
        std::iter::once(&mut self.start)
            .chain(self.obstacles.iter_mut())
            .chain(std::iter::once(&mut self.end))
    }

    /// Bounds for the current length (memoized)
    pub fn bounds(&mut self) -> &Bounds {
        let length = self.params.total_length();
        self.bounds.get_or_compute(&length, |&l| Bounds::generate(l))
    }

    /// How many times bounds have been generated
    pub fn bounds_generations(&self) -> u32 {
        self.bounds.computations()
    }

    /// How many times a sequence has been drawn
    pub fn sequence_draws(&self) -> u32 {
        self.sequence.computations()
    }

    /// Bring `world` in line with the level: remove retired bodies, register
    /// anything not yet mounted, and swap bounds if the length changed
    pub fn sync<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        for handle in self.retired.drain(..) {
            world.remove_body(handle);
        }

        for block in self.blocks_mut() {
            block.mount(world);
        }

        let length = self.params.total_length();
        if self.mounted_bounds.as_ref().is_some_and(|(l, _)| *l == length) {
            return;
        }
        if let Some((_, handles)) = self.mounted_bounds.take() {
            for handle in handles {
                world.remove_body(handle);
            }
        }
        let handles = self
            .bounds()
            .bodies
            .iter()
            .map(|desc| world.create_body(desc))
            .collect();
        self.mounted_bounds = Some((length, handles));
        log::debug!("Mounted bounds for {} segments", length);
    }

    /// Remove every body this level registered
    pub fn unmount<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W) {
        let mut handles: Vec<BodyHandle> = self.retired.drain(..).collect();
        for block in self.blocks_mut() {
            handles.extend(block.take_handles());
        }
        if let Some((_, bounds)) = self.mounted_bounds.take() {
            handles.extend(bounds);
        }
        for handle in handles {
            world.remove_body(handle);
        }
    }

    /// Per-frame update at elapsed time `t`, in scene order
    pub fn frame<W: PhysicsWorld + ?Sized>(&self, t: f32, world: &mut W) {
        for block in self.blocks() {
            block.update(t, world);
        }
    }

    /// Scene graph for the current state
    pub fn render(&mut self) -> Scene {
        let mut groups: Vec<Group> = self.blocks().map(Block::group).collect();

        let handles = self.mounted_bounds.as_ref().map(|(_, h)| h.clone());
        let bodies = self
            .bounds()
            .bodies
            .iter()
            .enumerate()
            .map(|(i, desc)| BodyNode {
                handle: handles.as_ref().and_then(|h| h.get(i).copied()),
                desc: desc.clone(),
            })
            .collect();
        groups.push(Group {
            label: "Bounds".to_string(),
            position: Vec3::ZERO,
            bodies,
        });

        Scene { groups }
    }
}

fn end_position(params: &LevelParams) -> Vec3 {
    Vec3::new(0.0, 0.0, segment_z(params.count + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::motion::MotionLaw;
    use crate::sim::physics::HeadlessWorld;
    use proptest::prelude::*;

    fn positions(level: &Level) -> Vec<Vec3> {
        level.blocks().map(|b| b.position).collect()
    }

    #[test]
    fn test_default_params() {
        let params = LevelParams::default();
        assert_eq!(params.count, 5);
        assert_eq!(
            params.types,
            vec![BlockKind::Spinner, BlockKind::Axe, BlockKind::Limbo]
        );
        assert_eq!(params.total_length(), 7);
    }

    #[test]
    fn test_zero_count_start_meets_end() {
        let mut level = Level::with_seed(LevelParams::new(0, BlockKind::OBSTACLES.to_vec()), 1);
        assert!(level.sequence().is_empty());
        assert_eq!(positions(&level), vec![Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0)]);
        assert_eq!(level.bounds().length, 2);
    }

    #[test]
    fn test_zero_count_allows_empty_types() {
        let level = Level::with_seed(LevelParams::new(0, Vec::new()), 1);
        assert_eq!(level.blocks().count(), 2);
    }

    #[test]
    #[should_panic(expected = "empty type set")]
    fn test_empty_types_panics() {
        Level::with_seed(LevelParams::new(3, Vec::new()), 1);
    }

    #[test]
    fn test_three_spinners() {
        let level = Level::with_seed(LevelParams::new(3, vec![BlockKind::Spinner]), 9);
        assert_eq!(level.sequence(), vec![BlockKind::Spinner; 3]);
        let obstacle_z: Vec<f32> = level
            .blocks()
            .filter(|b| b.kind == BlockKind::Spinner)
            .map(|b| b.position.z)
            .collect();
        assert_eq!(obstacle_z, vec![-4.0, -8.0, -12.0]);
        assert_eq!(level.blocks().last().unwrap().position.z, -16.0);
    }

    #[test]
    fn test_render_is_memoized() {
        let mut level = Level::with_seed(LevelParams::default(), 123);
        let first = level.render();
        let again = level.render();
        assert_eq!(first, again);
        assert_eq!(level.sequence_draws(), 1);
        assert_eq!(level.bounds_generations(), 1);

        // Same params are not a change
        let before = level.sequence();
        level.set_params(LevelParams::default());
        assert_eq!(level.sequence(), before);
        assert_eq!(level.sequence_draws(), 1);
    }

    #[test]
    fn test_param_change_redraws() {
        let mut level = Level::with_seed(LevelParams::default(), 5);
        level.set_count(8);
        assert_eq!(level.sequence().len(), 8);
        assert_eq!(level.sequence_draws(), 2);
        assert_eq!(level.bounds().length, 10);
        assert_eq!(level.bounds_generations(), 2);
        assert_eq!(level.blocks().last().unwrap().position.z, -36.0);
    }

    #[test]
    fn test_same_seed_same_course() {
        let a = Level::with_seed(LevelParams::new(20, BlockKind::OBSTACLES.to_vec()), 77);
        let b = Level::with_seed(LevelParams::new(20, BlockKind::OBSTACLES.to_vec()), 77);
        assert_eq!(a.sequence(), b.sequence());
        let laws = |l: &Level| -> Vec<MotionLaw> {
            l.blocks().filter_map(|b| b.obstacle.as_ref().map(|o| o.law)).collect()
        };
        assert_eq!(laws(&a), laws(&b));
    }

    #[test]
    fn test_reconcile_keeps_matching_slots() {
        let types = vec![BlockKind::Limbo];
        let mut level = Level::with_seed(LevelParams::new(2, types.clone()), 3);
        let mut world = HeadlessWorld::new();
        level.sync(&mut world);
        let law_before = level.obstacles[0].obstacle.as_ref().unwrap().law;
        let handle_before = level.obstacles[0].obstacle.as_ref().unwrap().handle();

        // Only one kind to draw from: existing slots keep their instances
        level.set_params(LevelParams::new(4, types));
        assert_eq!(level.obstacles[0].obstacle.as_ref().unwrap().law, law_before);
        level.sync(&mut world);
        assert_eq!(level.obstacles[0].obstacle.as_ref().unwrap().handle(), handle_before);
    }

    #[test]
    fn test_sync_replaces_stale_bodies() {
        let mut level = Level::with_seed(LevelParams::new(3, vec![BlockKind::Axe]), 3);
        let mut world = HeadlessWorld::new();
        level.sync(&mut world);
        // 5 floors + 3 obstacles + 5 side walls + terminal
        assert_eq!(world.len(), 14);

        // Nothing to do the second time
        level.sync(&mut world);
        assert_eq!(world.len(), 14);

        level.set_params(LevelParams::new(1, vec![BlockKind::Spinner]));
        level.sync(&mut world);
        // 3 floors + 1 obstacle + 3 side walls + terminal
        assert_eq!(world.len(), 8);

        level.unmount(&mut world);
        assert!(world.is_empty());
    }

    #[test]
    fn test_frame_before_sync_is_noop() {
        let level = Level::with_seed(LevelParams::default(), 8);
        let mut world = HeadlessWorld::new();
        level.frame(0.5, &mut world);
        assert!(world.is_empty());
    }

    #[test]
    fn test_frame_drives_obstacles() {
        let mut level = Level::with_seed(LevelParams::new(4, vec![BlockKind::Limbo]), 21);
        let mut world = HeadlessWorld::new();
        level.sync(&mut world);

        let t = 1.5;
        level.frame(t, &mut world);
        world.step(crate::consts::SIM_DT);

        for block in level.blocks() {
            let Some(obstacle) = &block.obstacle else {
                continue;
            };
            let MotionLaw::Limbo { time_offset } = obstacle.law else {
                panic!("only limbo blocks");
            };
            let pose = world.pose(obstacle.handle().unwrap()).unwrap();
            let expected = (t + time_offset).sin() + 1.15;
            assert!((pose.translation.y - expected).abs() < 1e-5);
            assert_eq!(pose.translation.z, block.position.z);
        }
    }

    #[test]
    fn test_render_reports_handles() {
        let mut level = Level::with_seed(LevelParams::new(1, vec![BlockKind::Axe]), 2);
        assert!(level.render().bodies().all(|b| b.handle.is_none()));

        let mut world = HeadlessWorld::new();
        level.sync(&mut world);
        let scene = level.render();
        assert!(scene.bodies().all(|b| b.handle.is_some()));
        assert_eq!(scene.groups.len(), 4);
        assert_eq!(scene.groups[3].label, "Bounds");
        assert_eq!(scene.groups[3].bodies.len(), 4);
    }

    proptest! {
        #[test]
        fn prop_sequence_len_and_members(
            count in 0usize..64,
            types in proptest::sample::subsequence(BlockKind::OBSTACLES.to_vec(), 1..=3),
            seed in any::<u64>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let seq = draw_sequence(count, &types, &mut rng);
            prop_assert_eq!(seq.len(), count);
            prop_assert!(seq.iter().all(|k| types.contains(k)));
        }

        #[test]
        fn prop_layout_positions(count in 0usize..32, seed in any::<u64>()) {
            let level = Level::with_seed(LevelParams::new(count, BlockKind::OBSTACLES.to_vec()), seed);
            let blocks: Vec<_> = level.blocks().collect();
            prop_assert_eq!(blocks.len(), count + 2);
            prop_assert_eq!(blocks[0].kind, BlockKind::Start);
            prop_assert_eq!(blocks[count + 1].kind, BlockKind::End);
            for (i, block) in blocks.iter().enumerate() {
                prop_assert_eq!(block.position, Vec3::new(0.0, 0.0, i as f32 * -4.0));
            }
        }
    }
}
