//! Announcement text for each level and the URLs the player fetches it from.

use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::{
    services::audio::{VoiceProfile, cache_key},
    state::timer::{Level, LevelKind},
};

/// Characters of the cache key carried in cue URLs.
const URL_KEY_LEN: usize = 16;

/// Playback transition that triggers an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueAction {
    /// The level starts from a stopped timer.
    Play,
    /// The countdown rolled over into this level.
    Continue,
}

impl CueAction {
    /// Every action, in the order cues are listed.
    pub const ALL: [CueAction; 2] = [CueAction::Play, CueAction::Continue];

    /// Name used in URLs and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            CueAction::Play => "play",
            CueAction::Continue => "continue",
        }
    }
}

impl fmt::Display for CueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CueAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "play" => Ok(CueAction::Play),
            "continue" => Ok(CueAction::Continue),
            other => Err(format!(
                "action `{other}` is not a valid action, expected one of: play,continue"
            )),
        }
    }
}

/// Sentence spoken when `level` starts through `action`.
pub fn cue_text(level: &Level, action: CueAction) -> String {
    let opener = match (level.kind, action) {
        (LevelKind::Blind, CueAction::Play) => "Let's Play Poker.",
        (LevelKind::Blind, CueAction::Continue) => "Blinds Up.",
        (LevelKind::Break, CueAction::Play | CueAction::Continue) => "It's break time.",
    };

    let (blinds, duration) = match level.kind {
        LevelKind::Blind => (
            Some(format!(
                "The blinds are now {}/{}.",
                level.small_blind, level.big_blind
            )),
            format!("This level will last for {} minutes", level.duration_minutes),
        ),
        LevelKind::Break => (
            None,
            format!("This break will last for {} minutes", level.duration_minutes),
        ),
    };

    [Some(opener.to_string()), blinds, Some(duration)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Audio URL for a cue; the version parameter follows the spoken content.
pub fn cue_url(timer_id: Uuid, level: &Level, action: CueAction, voice: &VoiceProfile) -> String {
    let key = cache_key(voice, &cue_text(level, action));
    format!(
        "/play/{timer_id}/levels/{}/audio/{action}?v={}",
        level.id,
        &key[..URL_KEY_LEN]
    )
}
