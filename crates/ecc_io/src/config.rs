//! Decoder configuration strings.
//!
//! A configuration is a comma separated list of `name=value` pairs, for
//! example `osd_method=osd_cs,osd_order=4`. Unlisted parameters keep their
//! defaults. Keys prefixed `lsd_` select the LSD flavour of post-processing.

use anyhow::{Result, anyhow};
use ecc_common::decoder::DecoderConfig;
use nom::IResult;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, space0};
use nom::combinator::all_consuming;
use nom::multi::separated_list0;
use nom::sequence::{delimited, separated_pair};

fn token(input: &str) -> IResult<&str, &str> {
    delimited(
        space0,
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
        space0,
    )(input)
}

fn pairs(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    all_consuming(delimited(
        space0,
        separated_list0(char(','), separated_pair(token, char('='), token)),
        space0,
    ))(input)
}

/// Parses a `name=value,...` string into a decoder configuration.
pub fn parse_decoder_config(input: &str) -> Result<DecoderConfig> {
    let (_, pairs) = pairs(input).map_err(|e| anyhow!("malformed decoder configuration: {e}"))?;

    let mut config = if pairs.iter().any(|(name, _)| name.starts_with("lsd_")) {
        DecoderConfig::bp_lsd()
    } else {
        DecoderConfig::bp_osd()
    };
    for (name, value) in pairs {
        config.set(name, value)?;
    }
    Ok(config)
}

/// Renders a configuration in the form accepted by [`parse_decoder_config`].
pub fn format_decoder_config(config: &DecoderConfig) -> String {
    config
        .to_pairs()
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}
