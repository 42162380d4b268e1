use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{Action, Match, Matches, Pattern, Rebulk, Rule, Tags};
use crate::rules::common::validators::{seps_after, seps_before};
use crate::rules::common::only_seps;
use crate::rules::properties::value_table;

const AUDIO_CODECS: &[(&str, &str)] = &[
    (r"MP3|LAME(?:\d+-?\d+)?", "MP3"),
    (r"MP2", "MP2"),
    (r"Dolby|Dolby-?Digital|DD|AC-?3D?", "Dolby Digital"),
    (r"DDP|DD\+|E-?AC-?3|Dolby-?Digital-?Plus", "Dolby Digital Plus"),
    (r"True-?HD|Dolby-?TrueHD", "Dolby TrueHD"),
    (r"Atmos|Dolby-?Atmos", "Dolby Atmos"),
    (r"AAC", "AAC"),
    (r"FLAC", "FLAC"),
    (r"DTS", "DTS"),
    (r"DTS-?HD(?:-?MA)?|DTS-?MA", "DTS-HD"),
    (r"DTS:?X", "DTS:X"),
    (r"OPUS", "Opus"),
    (r"Vorbis", "Vorbis"),
    (r"L?PCM", "PCM"),
];

const AUDIO_CHANNELS: &[(&str, &str)] = &[
    (r"7[\W_][01](?:ch)?|[78]ch", "7.1"),
    (r"5[\W_][01](?:ch)?|6ch", "5.1"),
    (r"2[\W_]0(?:ch)?|2ch|stereo", "2.0"),
    (r"1[\W_]0(?:ch)?|1ch|mono", "1.0"),
];

/// Glued channel counts (`DD51`, `AAC20`), only valid after a codec.
const WEAK_AUDIO_CHANNELS: &[(&str, &str)] = &[("71", "7.1"), ("51", "5.1"), ("20", "2.0")];

/// Codecs may be glued to their channel count (`AAC2.0`, `DD5.1`).
fn codec_surround(matches: &Matches, m: &Match) -> bool {
    seps_before(matches, m)
        && (seps_after(matches, m)
            || matches.input()[m.end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit()))
}

fn channels_surround(matches: &Matches, m: &Match) -> bool {
    seps_after(matches, m)
        && (seps_before(matches, m)
            || matches.input()[..m.start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphabetic))
}

pub fn audio_codec() -> Result<Rebulk> {
    Ok(Rebulk::new("audio_codec")
        .disabled(|o| o.is_disabled("audio_codec"))
        .patterns(value_table("audio_codec", AUDIO_CODECS, codec_surround)?))
}

pub fn audio_channels() -> Result<Rebulk> {
    let weak = WEAK_AUDIO_CHANNELS
        .iter()
        .map(|(raw, value)| {
            Pattern::string("audio_channels", &[*raw])
                .value(*value)
                .tags(Tags::WEAK_AUDIO_CHANNELS)
                .validator(seps_after)
        });
    Ok(Rebulk::new("audio_channels")
        .disabled(|o| o.is_disabled("audio_channels"))
        .patterns(value_table("audio_channels", AUDIO_CHANNELS, channels_surround)?)
        .patterns(weak)
        .rule(AudioChannelsValidatorRule))
}

/// Drops glued channel counts that do not directly follow an audio codec.
pub struct AudioChannelsValidatorRule;

impl Rule for AudioChannelsValidatorRule {
    fn name(&self) -> &'static str {
        "AudioChannelsValidatorRule"
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        matches
            .named_where("audio_channels", |m| m.tags.contains(Tags::WEAK_AUDIO_CHANNELS))
            .into_iter()
            .filter(|channels| {
                let previous = matches.previous(channels, |p| !p.private);
                !previous.first().is_some_and(|p| {
                    p.name == "audio_codec" && only_seps(matches.slice(p.end, channels.start))
                })
            })
            .map(|m| Action::Remove(m.id()))
            .collect()
    }
}
