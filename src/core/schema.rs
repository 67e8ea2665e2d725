// The action repertoire: nine guarded production rules over the workspace.
//
// Preconditions are pure and total; it is always safe to evaluate all of
// them before picking one to execute. Effects assume their precondition
// currently holds and mutate the environment in place, recomputing the
// population codes before returning. Rule order in the repertoire carries
// no priority semantics; tie-breaking among simultaneously eligible
// schemas belongs to the agent's selection policy.

use crate::agent::Agent;
use crate::environment::{Environment, NECK_FLOOR, X_MAX};
use crate::position::{
    abs_diff_eq_to, abs_diff_g_than, abs_diff_geq_than, abs_diff_l_than, abs_diff_leq_than, Pos,
};
use hashbrown::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Relevant,
    /// Distractor/no-op class kept purely as a negative training label.
    Irrelevant,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Relevant => "relevant",
            Category::Irrelevant => "irrelevant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Eat,
    GraspJaws,
    BringToMouth,
    GraspPaw,
    ReachFood,
    ReachTube,
    Rake,
    LowerNeck,
    RaiseNeck,
    Irrelevant,
}

impl SchemaKind {
    /// The manipulation schemas, in catalogue order.
    pub const RELEVANT: [SchemaKind; 9] = [
        SchemaKind::Eat,
        SchemaKind::GraspJaws,
        SchemaKind::BringToMouth,
        SchemaKind::GraspPaw,
        SchemaKind::ReachFood,
        SchemaKind::ReachTube,
        SchemaKind::Rake,
        SchemaKind::LowerNeck,
        SchemaKind::RaiseNeck,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SchemaKind::Eat => "eat",
            SchemaKind::GraspJaws => "grasp_jaws",
            SchemaKind::BringToMouth => "bring_to_mouth",
            SchemaKind::GraspPaw => "grasp_paw",
            SchemaKind::ReachFood => "reach_food",
            SchemaKind::ReachTube => "reach_tube",
            SchemaKind::Rake => "rake",
            SchemaKind::LowerNeck => "lower_neck",
            SchemaKind::RaiseNeck => "raise_neck",
            SchemaKind::Irrelevant => "irrelevant_action",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eat" => Some(SchemaKind::Eat),
            "grasp_jaws" => Some(SchemaKind::GraspJaws),
            "bring_to_mouth" => Some(SchemaKind::BringToMouth),
            "grasp_paw" => Some(SchemaKind::GraspPaw),
            "reach_food" => Some(SchemaKind::ReachFood),
            "reach_tube" => Some(SchemaKind::ReachTube),
            "rake" => Some(SchemaKind::Rake),
            "lower_neck" => Some(SchemaKind::LowerNeck),
            "raise_neck" => Some(SchemaKind::RaiseNeck),
            "irrelevant_action" => Some(SchemaKind::Irrelevant),
            _ => None,
        }
    }

    pub fn category(self) -> Category {
        match self {
            SchemaKind::Irrelevant => Category::Irrelevant,
            _ => Category::Relevant,
        }
    }

    // Display labels are cosmetic metadata for downstream plots; logic
    // never consults them.
    fn color(self) -> &'static str {
        match self {
            SchemaKind::Eat => "b",
            SchemaKind::GraspJaws => "g",
            SchemaKind::BringToMouth => "r",
            SchemaKind::GraspPaw => "c",
            SchemaKind::ReachFood => "m",
            SchemaKind::ReachTube => "y",
            SchemaKind::Rake => "darkgrey",
            SchemaKind::LowerNeck => "rosybrown",
            SchemaKind::RaiseNeck => "darksalmon",
            SchemaKind::Irrelevant => "brown",
        }
    }

    fn marker(self) -> &'static str {
        match self {
            SchemaKind::Eat => "o",
            SchemaKind::GraspJaws => "s",
            SchemaKind::BringToMouth => "x",
            SchemaKind::GraspPaw => ".",
            SchemaKind::ReachFood => "|",
            SchemaKind::ReachTube => "*",
            SchemaKind::Rake => "D",
            SchemaKind::LowerNeck => "1",
            SchemaKind::RaiseNeck => "2",
            SchemaKind::Irrelevant => "",
        }
    }
}

/// One slot of the repertoire: a rule plus its fixed labels. Immutable and
/// stateless after construction; all mutable state lives in the
/// environment and the agent.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub kind: SchemaKind,
    pub name: &'static str,
    pub category: Category,
    pub color: &'static str,
    pub marker: &'static str,
    /// Impaired-motor-control variant; only the paw grasp branches on it.
    pub lesion: bool,
}

impl Schema {
    pub fn new(kind: SchemaKind, lesion: bool) -> Self {
        Self {
            kind,
            name: kind.name(),
            category: kind.category(),
            color: kind.color(),
            marker: kind.marker(),
            lesion: lesion && kind.category() == Category::Relevant,
        }
    }

    /// Whether this schema is eligible in the current state. Pure.
    pub fn preconditions(&self, env: &Environment) -> bool {
        match self.kind {
            // Food in jaws.
            SchemaKind::Eat => abs_diff_l_than(env.food, env.mouth, 1),

            // Food close to jaws but not already there.
            SchemaKind::GraspJaws => {
                abs_diff_g_than(env.food, env.mouth, 1)
                    && abs_diff_leq_than(env.food, env.mouth, 5)
            }

            // Food grasped by the paw, but far from the mouth.
            SchemaKind::BringToMouth => {
                abs_diff_eq_to(env.food, env.paw, 0) && abs_diff_g_than(env.mouth, env.food, 5)
            }

            // Paw close to the food without holding it yet.
            SchemaKind::GraspPaw => {
                abs_diff_g_than(env.paw, env.food, 0) && abs_diff_leq_than(env.paw, env.food, 5)
            }

            // Food far away on the floor, or in the tube with the paw
            // already near the tube.
            SchemaKind::ReachFood => {
                (abs_diff_geq_than(env.food, env.paw, 5) && env.food.y == 0)
                    || (env.food.y == env.tube.y && abs_diff_l_than(env.paw, env.tube, 5))
            }

            // Paw not at the tube's reach point.
            SchemaKind::ReachTube => env.paw.x < env.tube.x || env.paw.y != env.tube.y + 1,

            // Paw beyond and above the food, food not already at the body.
            SchemaKind::Rake => {
                abs_diff_g_than(env.paw, env.food, 0)
                    && abs_diff_leq_than(env.paw, env.food, 5)
                    && env.paw.x >= env.food.x
                    && env.paw.y > env.food.y
                    && env.food.x > 1
            }

            SchemaKind::LowerNeck => env.mouth.y > NECK_FLOOR,

            SchemaKind::RaiseNeck => env.mouth.y < env.v_max,

            // Always eligible as a fallback label.
            SchemaKind::Irrelevant => true,
        }
    }

    /// Apply this schema's state mutation and return the reward.
    ///
    /// Only valid while `preconditions` holds; the caller checks first.
    /// Every arm that moves a position recomputes the population codes
    /// before returning.
    pub fn effects(&self, env: &mut Environment, agent: &mut Agent) -> i32 {
        match self.kind {
            SchemaKind::Eat => {
                // Terminal: the drive resets, nothing moves.
                agent.hunger = 0.0;
                1
            }

            SchemaKind::GraspJaws => {
                env.mouth = env.food;
                env.compute_population_codes();
                0
            }

            SchemaKind::BringToMouth => {
                // Stage the food near the mouth without putting it inside,
                // so the jaw grasp stays executable next step.
                env.paw = env.mouth + (5, 0);
                env.food = env.paw;
                env.compute_population_codes();
                0
            }

            SchemaKind::GraspPaw => {
                if !self.lesion {
                    env.paw = env.food;
                } else {
                    // Overshoot, then scatter the food horizontally.
                    env.paw = env.food + (0, 5);
                    let offset = env.rng.gen_range_i32(-8, 3);
                    env.food.x = (env.food.x + offset).clamp(0, X_MAX);
                    // Knocked short of the tube entrance: it falls out.
                    if env.food.y == env.tube.y && env.food.x < env.tube.x {
                        env.food.y = 0;
                    }
                }
                env.compute_population_codes();
                0
            }

            SchemaKind::ReachFood => {
                env.paw = env.food + (0, 1);
                env.compute_population_codes();
                0
            }

            SchemaKind::ReachTube => {
                let prev_paw = env.paw;
                env.paw = env.tube + (3, 1);
                // Food already grasped moves with the paw.
                if env.food == prev_paw {
                    env.food = env.paw;
                }
                env.compute_population_codes();
                0
            }

            SchemaKind::Rake => {
                if env.food.y > 0 {
                    // Knock it out of the tube onto the floor.
                    env.food = Pos::new(env.tube.x - 1, 0);
                } else {
                    // Already on the floor: rake it in to the body.
                    env.food = Pos::new(1, 0);
                }
                env.paw = env.food + (1, 3);
                env.compute_population_codes();
                0
            }

            SchemaKind::LowerNeck => {
                let prev_mouth = env.mouth;
                env.mouth.y = NECK_FLOOR;
                if env.food == prev_mouth {
                    env.food = env.mouth;
                }
                env.compute_population_codes();
                0
            }

            SchemaKind::RaiseNeck => {
                let prev_mouth = env.mouth;
                env.mouth.y = env.v_max;
                if env.food == prev_mouth {
                    env.food = env.mouth;
                }
                env.compute_population_codes();
                0
            }

            SchemaKind::Irrelevant => 0,
        }
    }
}

/// The fixed, ordered catalogue of schemas. Built once per agent (the
/// lesion flag is experiment-scoped) and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Repertoire {
    schemas: Vec<Schema>,
    by_name: HashMap<&'static str, usize>,
}

impl Repertoire {
    /// The relevant manipulation schemas plus the irrelevant no-op.
    pub fn standard(lesion: bool) -> Self {
        let mut kinds: Vec<SchemaKind> = SchemaKind::RELEVANT.to_vec();
        kinds.push(SchemaKind::Irrelevant);
        Self::from_kinds(&kinds, lesion)
    }

    pub fn from_kinds(kinds: &[SchemaKind], lesion: bool) -> Self {
        let schemas: Vec<Schema> = kinds.iter().map(|&k| Schema::new(k, lesion)).collect();
        let by_name = schemas
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name, i))
            .collect();
        Self { schemas, by_name }
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Schema> {
        self.schemas.get(slot)
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.iter()
    }

    /// Slots whose preconditions hold right now, in catalogue order.
    pub fn eligible(&self, env: &Environment) -> Vec<usize> {
        self.schemas
            .iter()
            .enumerate()
            .filter(|(_, s)| s.preconditions(env))
            .map(|(i, _)| i)
            .collect()
    }

    /// One-hot label over repertoire slots (the training signal).
    pub fn one_hot(&self, slot: usize) -> Vec<f32> {
        let mut v = vec![0.0; self.schemas.len()];
        if let Some(x) = v.get_mut(slot) {
            *x = 1.0;
        }
        v
    }
}
