//! Finished routes and their diagnostic score.

use crate::{
    GameQuery, Node, ObstacleId,
    config::PlannerConfig,
    planner::{Segment, TargetKind},
};

/// A contiguous chain of segments from the agent to a target.
///
/// All aggregates are computed once in [`Path::evaluate`]; a `Path` exposes
/// read-only accessors and cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
    target_kind: TargetKind,
    start: Node,
    end: Node,
    length: u32,
    pills_count: u32,
    power_pills_count: u32,
    ghosts: Vec<ObstacleId>,
    safe: bool,
    value: i32,
    description: String,
}

impl Path {
    /// Finalizes `segments` into a path, or `None` if there are none.
    ///
    /// The score starts at the number of pills on the route. Walking the
    /// segments in order, each edible ghost reference adds
    /// `edible_ghost_bonus`, each power pill adds `power_pill_bonus` and each
    /// unsafe segment subtracts `unsafe_penalty`. A segment whose parent is
    /// unsafe becomes unsafe as well.
    pub fn evaluate(
        mut segments: Vec<Segment>,
        target_kind: TargetKind,
        game: &dyn GameQuery,
        config: &PlannerConfig,
    ) -> Option<Self> {
        let first = segments.first()?;
        let last = segments.last()?;
        let start = first.start;
        let end = last.end;
        let length = last.length_so_far;
        let pills_count = last.pills_count;
        let power_pills_count = last.power_pills_count;

        let mut value = pills_count as i32;
        let mut ghosts = Vec::new();
        let mut unsafe_segments = 0;
        let mut power_pills_seen = 0;
        let mut moves = Vec::with_capacity(segments.len());

        for i in 0..segments.len() {
            for &ghost in &segments[i].ghosts_present {
                ghosts.push(ghost);
                if game.is_obstacle_edible(ghost) {
                    value += config.edible_ghost_bonus;
                }
            }

            if let Some(parent) = segments[i].parent.filter(|p| *p < i) {
                if !segments[parent].safe {
                    segments[i].safe = false;
                }
            }

            let segment = &segments[i];
            if !segment.safe {
                unsafe_segments += 1;
                value -= config.unsafe_penalty;
            }

            let new_power_pills = segment.power_pills_count.saturating_sub(power_pills_seen);
            value += new_power_pills as i32 * config.power_pill_bonus;
            power_pills_seen = power_pills_seen.max(segment.power_pills_count);

            moves.push(segment.direction.to_string());
        }

        Some(Path {
            segments,
            target_kind,
            start,
            end,
            length,
            pills_count,
            power_pills_count,
            ghosts,
            safe: unsafe_segments == 0,
            value,
            description: moves.join(" "),
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn target_kind(&self) -> TargetKind {
        self.target_kind
    }

    /// Node the first hop lands on.
    pub fn start(&self) -> Node {
        self.start
    }

    /// The target node.
    pub fn end(&self) -> Node {
        self.end
    }

    /// Number of hops.
    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn pills_count(&self) -> u32 {
        self.pills_count
    }

    pub fn power_pills_count(&self) -> u32 {
        self.power_pills_count
    }

    /// Every ghost reference on the route, one entry per segment it was seen on.
    pub fn ghosts(&self) -> &[ObstacleId] {
        &self.ghosts
    }

    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// Diagnostic score of the route.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Space separated move names, e.g. `"RIGHT RIGHT DOWN"`.
    pub fn description(&self) -> &str {
        &self.description
    }
}
