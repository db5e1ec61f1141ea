//! Moderator message templates.
//!
//! Moderators see a short message in the meeting chat with the join link and,
//! when the room has one, the viewer access code. The text is localized using
//! the acting user's locale, falling back to the configured default locale and
//! finally to English.

/// Separator between message lines. The backend renders the message as HTML.
pub const LINE_BREAK: &str = "<br>";

/// Placeholder replaced by the access code.
const CODE_PLACEHOLDER: &str = "{code}";

/// Translations for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingMessages {
    /// Locale tag.
    pub locale: &'static str,

    /// Invitation line preceding the join URL.
    pub moderator_message: &'static str,

    /// Access code line, containing `{code}`.
    pub access_code: &'static str,
}

const ENGLISH: MeetingMessages = MeetingMessages {
    locale: "en",
    moderator_message: "To invite someone to the meeting, send them this link:",
    access_code: "Access Code: {code}",
};

const CATALOG: &[MeetingMessages] = &[
    ENGLISH,
    MeetingMessages {
        locale: "fr",
        moderator_message: "Pour inviter quelqu'un à la réunion, envoyez-lui ce lien :",
        access_code: "Code d'accès : {code}",
    },
    MeetingMessages {
        locale: "de",
        moderator_message: "Um jemanden zur Konferenz einzuladen, senden Sie ihm diesen Link:",
        access_code: "Zugangscode: {code}",
    },
    MeetingMessages {
        locale: "es",
        moderator_message: "Para invitar a alguien a la reunión, envíele este enlace:",
        access_code: "Código de acceso: {code}",
    },
    MeetingMessages {
        locale: "pt",
        moderator_message: "Para convidar alguém para a reunião, envie este link:",
        access_code: "Código de acesso: {code}",
    },
];

/// Find the exact locale or its primary language subtag (`fr-CA` -> `fr`).
fn lookup(locale: &str) -> Option<&'static MeetingMessages> {
    let normalized = locale.trim().replace('_', "-").to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }

    CATALOG
        .iter()
        .find(|m| m.locale == normalized)
        .or_else(|| {
            let primary = normalized.split('-').next()?;
            CATALOG.iter().find(|m| m.locale == primary)
        })
}

/// Moderator message catalog with an explicit default locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    default_locale: String,
}

impl MessageCatalog {
    /// Create a catalog falling back to `default_locale`.
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
        }
    }

    /// Resolve the translations for `locale`.
    pub fn messages(&self, locale: Option<&str>) -> &'static MeetingMessages {
        locale
            .and_then(lookup)
            .or_else(|| lookup(&self.default_locale))
            .unwrap_or(&ENGLISH)
    }

    /// Build the moderator-only message.
    ///
    /// The access code line is only added for a code with non-blank content.
    pub fn moderator_message(
        &self,
        locale: Option<&str>,
        join_url: &str,
        access_code: Option<&str>,
    ) -> String {
        let messages = self.messages(locale);
        let mut message = format!("{}{}{}", messages.moderator_message, LINE_BREAK, join_url);

        if let Some(code) = access_code.filter(|c| !c.trim().is_empty()) {
            message.push_str(LINE_BREAK);
            message.push_str(&messages.access_code.replace(CODE_PLACEHOLDER, code));
        }

        message
    }
}
