// Transition records for the downstream mirror-system trainer, plus two
// on-disk forms: JSON Lines for inspection and an LZ4-compressed binary
// container for bulk datasets.
//
// Container layout: MAGIC, version, raw JSON length, compressed length,
// raw LZ4 block. Strict format: the block carries no self-describing
// size, so the raw length travels in the header.

use std::io::{self, Read, Write};

use crate::agent::{Agent, StepOutcome};
use crate::schema::Repertoire;

pub const MAGIC: &[u8; 8] = b"GRASPW01";
pub const VERSION_CURRENT: u32 = 1;

/// One executed step, in the shape the training pipeline consumes:
/// population codes before and after, the drive level once the effect has
/// applied, the executed schema's name and its reward.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transition {
    pub before: Vec<f32>,
    pub after: Vec<f32>,
    pub hunger: f32,
    pub schema: String,
    pub reward: i32,
}

impl Transition {
    /// Build a record from the agent's snapshots of the step that produced
    /// `outcome`. `None` if the agent has not acted yet.
    pub fn from_step(agent: &Agent, repertoire: &Repertoire, outcome: StepOutcome) -> Option<Self> {
        let before = agent.current_state.as_ref()?;
        let after = agent.next_state.as_ref()?;
        let schema = repertoire.get(outcome.slot)?;
        Some(Self {
            before: before.codes.clone(),
            after: after.codes.clone(),
            // The drive as the trainer sees it: already zeroed by an eat.
            hunger: after.hunger,
            schema: schema.name.to_string(),
            reward: outcome.reward,
        })
    }
}

/// One JSON object per line.
pub fn write_jsonl<W: Write>(w: &mut W, transitions: &[Transition]) -> io::Result<()> {
    for t in transitions {
        serde_json::to_writer(&mut *w, t)?;
        w.write_all(b"\n")?;
    }
    Ok(())
}

pub fn save<W: Write>(w: &mut W, transitions: &[Transition]) -> io::Result<()> {
    let json = serde_json::to_vec(transitions)?;
    let compressed = lz4_flex::compress(&json);

    w.write_all(MAGIC)?;
    write_u32_le(w, VERSION_CURRENT)?;
    write_u32_le(w, json.len() as u32)?;
    write_u32_le(w, compressed.len() as u32)?;
    w.write_all(&compressed)
}

pub fn load<R: Read>(r: &mut R) -> io::Result<Vec<Transition>> {
    let magic: [u8; 8] = read_exact(r)?;
    if &magic != MAGIC {
        return Err(invalid_data("bad magic"));
    }
    let version = read_u32_le(r)?;
    if version != VERSION_CURRENT {
        return Err(invalid_data("unsupported version"));
    }

    let raw_len = read_u32_le(r)? as usize;
    let comp_len = read_u32_le(r)? as usize;
    let mut compressed = vec![0u8; comp_len];
    r.read_exact(&mut compressed)?;

    let json = lz4_flex::decompress(&compressed, raw_len)
        .map_err(|_| invalid_data("lz4 decompression failed"))?;
    Ok(serde_json::from_slice(&json)?)
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.to_string())
}

fn write_u32_le<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn read_u32_le<R: Read>(r: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_exact(r)?))
}

fn read_exact<const N: usize, R: Read>(r: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, FirstEligible};
    use crate::environment::{Environment, EnvironmentConfig};

    fn sample_transitions(n: usize) -> Vec<Transition> {
        let mut env = Environment::new(EnvironmentConfig::default()).unwrap();
        let repertoire = Repertoire::standard(false);
        let mut agent = Agent::new();
        let mut policy = FirstEligible;

        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if agent.sated() {
                agent.hunger = 1.0;
                env.reset();
            }
            let outcome = agent.act(&mut env, &repertoire, &mut policy).unwrap();
            out.push(Transition::from_step(&agent, &repertoire, outcome).unwrap());
        }
        out
    }

    #[test]
    fn from_step_uses_post_effect_hunger() {
        let transitions = sample_transitions(12);
        for t in &transitions {
            assert_eq!(t.before.len(), t.after.len());
            if t.reward == 1 {
                assert_eq!(t.schema, "eat");
                // The record carries the drive after the effect: an eat
                // has already zeroed it.
                assert_eq!(t.hunger, 0.0);
            } else {
                assert_eq!(t.hunger, 1.0);
            }
        }
        assert!(transitions.iter().any(|t| t.reward == 1));
    }

    #[test]
    fn container_roundtrip() {
        let transitions = sample_transitions(8);
        let mut buf = Vec::new();
        save(&mut buf, &transitions).unwrap();
        let loaded = load(&mut buf.as_slice()).unwrap();
        assert_eq!(loaded, transitions);
    }

    #[test]
    fn container_rejects_bad_magic() {
        let transitions = sample_transitions(2);
        let mut buf = Vec::new();
        save(&mut buf, &transitions).unwrap();
        buf[0] ^= 0xFF;
        let err = load(&mut buf.as_slice()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn jsonl_is_one_record_per_line() {
        let transitions = sample_transitions(3);
        let mut buf = Vec::new();
        write_jsonl(&mut buf, &transitions).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 3);
        for line in text.lines() {
            let t: Transition = serde_json::from_str(line).unwrap();
            assert!(!t.schema.is_empty());
        }
    }
}
