use ai_core::{EntityId, FactId, Tag, Vec2, WorldEvent, WorldMut};

/// Visible body state an action may put an agent in. Actions restore `Standing` on exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Pose {
    #[default]
    Standing,
    Working,
    Eating,
    Resting,
    Mating,
}

/// World access needed by life-sim actions, goals and state contributors.
///
/// Drives are boolean facts owned by the world (hunger, sleepiness, ...); the agent only observes
/// them through its state cache and relieves them through actions.
pub trait LifeWorld: WorldMut {
    fn drive(&self, agent: EntityId, drive: FactId) -> Option<bool>;

    fn set_drive(&mut self, agent: EntityId, drive: FactId, active: bool);

    /// Category of the item in the agent's hands.
    fn held(&self, agent: EntityId) -> Option<Tag>;

    fn set_held(&mut self, agent: EntityId, item: Option<Tag>);

    fn stockpile_count(&self, stockpile: EntityId, item: Tag) -> u32;

    fn store(&mut self, stockpile: EntityId, item: Tag);

    /// Remove one `item` from the stockpile. Returns `false` when there was none.
    fn take(&mut self, stockpile: EntityId, item: Tag) -> bool;

    fn pose(&self, agent: EntityId) -> Pose;

    fn set_pose(&mut self, agent: EntityId, pose: Pose);

    /// Where the agent is currently heading, if anywhere.
    fn motion_target(&self, agent: EntityId) -> Option<Vec2>;

    fn set_motion_target(&mut self, agent: EntityId, target: Option<Vec2>);

    /// `partner` is willing and able to mate with `agent` right now.
    fn is_compatible_partner(&self, agent: EntityId, partner: EntityId) -> bool;

    /// Move pending spawn/despawn notifications into `out`.
    fn drain_events(&mut self, out: &mut Vec<WorldEvent>);
}
