use anyhow::{anyhow, Context, Result};

pub const DEFAULT_SEED_START: u32 = 0xA57E_0001;

/// Accepts `0x`-prefixed hex or plain decimal.
pub fn parse_seed(seed: &str) -> Result<u32> {
    let s = seed.trim();
    if s.is_empty() {
        return Err(anyhow!("empty seed"));
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("invalid hex seed: {s}")),
        None => s
            .replace('_', "")
            .parse::<u32>()
            .with_context(|| format!("invalid decimal seed: {s}")),
    }
}

pub fn seed_to_hex(seed: u32) -> String {
    format!("0x{seed:08x}")
}

/// `count` seeds from an LCG walk starting at `start`.
pub fn generate_seeds(start: u32, count: u32) -> Vec<u32> {
    let mut cur = start;
    (0..count)
        .map(|_| {
            let seed = cur;
            cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed
        })
        .collect()
}

/// Explicit comma-separated seeds win; otherwise `count` generated seeds.
pub fn resolve_seeds(csv: Option<&str>, start: Option<&str>, count: u32) -> Result<Vec<u32>> {
    if let Some(csv) = csv {
        let seeds = csv
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(parse_seed)
            .collect::<Result<Vec<_>>>()?;
        if seeds.is_empty() {
            return Err(anyhow!("no seeds parsed from --seeds"));
        }
        return Ok(seeds);
    }

    let start = match start {
        Some(start) => parse_seed(start)?,
        None => DEFAULT_SEED_START,
    };
    if count == 0 {
        return Err(anyhow!("--seed-count must be >= 1"));
    }
    Ok(generate_seeds(start, count))
}
