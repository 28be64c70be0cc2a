//! Chat channels and their fan-out.

use log::{debug, warn};

use super::character::{Character, PERMISSION_BUILD, PERMISSION_SYSOP};
use super::characters::CharacterManager;
use super::text::{punctuate, Color, TextType};
use crate::logutil::escape_log;

#[derive(Debug, PartialEq, Eq)]
pub struct Channel {
    pub name: &'static str,
    pub description: &'static str,
    pub color: Color,
    /// Permission a character needs to take part, if any.
    pub permission: Option<&'static str>,
}

static CHANNELS: [Channel; 3] = [
    Channel {
        name: "General",
        description: "Talk about anything game-related.",
        color: Color::Yellow,
        permission: None,
    },
    Channel {
        name: "Core",
        description: "Chat with the people who run the world.",
        color: Color::Magenta,
        permission: Some(PERMISSION_SYSOP),
    },
    Channel {
        name: "Builders",
        description: "Chat with other world builders.",
        color: Color::Cyan,
        permission: Some(PERMISSION_BUILD),
    },
];

pub fn channels() -> &'static [Channel] {
    &CHANNELS
}

/// Case-insensitive lookup.
pub fn channel_by_name(name: &str) -> Option<&'static Channel> {
    let name = name.trim();
    CHANNELS.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

impl Channel {
    pub fn has_permission(&self, character: &Character) -> bool {
        match self.permission {
            Some(p) => character.has_permission(p),
            None => true,
        }
    }

    /// Send `text` to every online subscriber except `from`, then confirm to
    /// `from`. `None` means a system announcement. Permission checks are the
    /// caller's job.
    pub fn broadcast(
        &self,
        characters: &CharacterManager,
        from: Option<&Character>,
        text: &str,
    ) -> BroadcastReport {
        let (to_others, to_sender) = match from {
            Some(sender) => {
                let line = punctuate(text);
                let kind = TextType::classify(&line);
                (
                    format!(
                        "[{}] {} {}, \"{}\"",
                        self.name,
                        sender.formatted_name_with_title(),
                        kind.verb_third_person(),
                        line
                    ),
                    Some(format!("[{}] You {}, \"{}\"", self.name, kind.verb(), line)),
                )
            }
            None => (format!("[{}] {}", self.name, text), None),
        };

        let mut report = BroadcastReport::default();
        for recipient in characters.online_characters() {
            if from.map_or(false, |f| f == &recipient) || !recipient.in_channel(self) {
                continue;
            }
            let Some(client) = recipient.client() else {
                continue;
            };
            match client.show_colorized_text(&to_others, self.color) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        "[{}] delivery to {} failed: {}",
                        self.name,
                        escape_log(&recipient.name()),
                        e
                    );
                }
            }
        }

        if let (Some(sender), Some(line)) = (from, to_sender) {
            if let Some(client) = sender.client() {
                match client.show_colorized_text(&line, self.color) {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            "[{}] confirmation to {} failed: {}",
                            self.name,
                            escape_log(&sender.name()),
                            e
                        );
                    }
                }
            }
        }
        debug!(
            "[{}] broadcast delivered={} failed={}",
            self.name, report.delivered, report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(channel_by_name("general").map(|c| c.name), Some("General"));
        assert_eq!(channel_by_name(" BUILDERS ").map(|c| c.name), Some("Builders"));
        assert!(channel_by_name("ooc").is_none());
    }

    #[test]
    fn only_staff_channels_need_permissions() {
        let gated: Vec<_> = channels()
            .iter()
            .filter_map(|c| c.permission.map(|p| (c.name, p)))
            .collect();
        assert_eq!(
            gated,
            vec![("Core", PERMISSION_SYSOP), ("Builders", PERMISSION_BUILD)]
        );
    }
}
