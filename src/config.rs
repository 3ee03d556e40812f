//! Widget configuration
//!
//! Read once at startup from `CHAT_WIDGET_*` environment variables. Text
//! content (branding, seed conversation, composer labels) is fixed and only
//! the canned reply can be overridden.

use crate::render::{Appearance, ChatPosition, ChatSize};
use crate::reply::DEFAULT_CANNED_REPLY;
use crate::state_machine::state::DEFAULT_REPLY_DELAY;
use crate::state_machine::Message;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

const FALLBACK_REPLY: &str = "عذراً، حدث خطأ أثناء معالجة رسالتك. يرجى المحاولة مرة أخرى.";

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// A branding link rendered in the panel header
#[derive(Debug, Clone)]
pub struct SocialLink {
    pub label: String,
    pub href: String,
    /// Brand color of the icon
    pub color: String,
}

/// Header and avatar text of the widget
#[derive(Debug, Clone)]
pub struct Branding {
    pub bot_name: String,
    pub status: String,
    pub heading: String,
    pub subheading: String,
    pub links: Vec<SocialLink>,
    pub user_avatar: String,
    pub agent_avatar: String,
    pub typing_label: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            bot_name: "بي ستايل بوت".to_string(),
            status: "نشطون دائماً".to_string(),
            heading: "دردش مع الذكاء الاصطناعي ✨".to_string(),
            subheading: "اسألني أي شيء عن خدماتنا".to_string(),
            links: vec![
                SocialLink {
                    label: "فيسبوك".to_string(),
                    href: "https://web.facebook.com/profile.php?id=61566737491653".to_string(),
                    color: "#1877F2".to_string(),
                },
                SocialLink {
                    label: "انستغرام".to_string(),
                    href: "https://www.instagram.com/bstylejo/".to_string(),
                    color: "#E4405F".to_string(),
                },
            ],
            user_avatar: "أنت".to_string(),
            agent_avatar: "بوت".to_string(),
            typing_label: "يكتب...".to_string(),
        }
    }
}

/// Labels of the composer form
#[derive(Debug, Clone)]
pub struct ComposerText {
    pub placeholder: String,
    pub send_label: String,
}

impl Default for ComposerText {
    fn default() -> Self {
        Self {
            placeholder: "اكتب رسالتك هنا...".to_string(),
            send_label: "إرسال الرسالة".to_string(),
        }
    }
}

/// Full widget configuration
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub port: u16,
    pub reply_delay: Duration,
    pub reply_timeout: Duration,
    /// Widgets untouched this long with no stream attached are disposed
    pub idle_ttl: Duration,
    pub reply_text: String,
    pub fallback_reply: String,
    /// Start new widgets with the greeting exchange
    pub seed_conversation: bool,
    pub appearance: Appearance,
    pub branding: Branding,
    pub composer: ComposerText,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            reply_delay: DEFAULT_REPLY_DELAY,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            idle_ttl: DEFAULT_IDLE_TTL,
            reply_text: DEFAULT_CANNED_REPLY.to_string(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            seed_conversation: true,
            appearance: Appearance {
                position: ChatPosition::BottomRight,
                size: ChatSize::Lg,
            },
            branding: Branding::default(),
            composer: ComposerText::default(),
        }
    }
}

impl WidgetConfig {
    /// Load from process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "CHAT_WIDGET_PORT")? {
            config.port = port;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CHAT_WIDGET_REPLY_DELAY_MS")? {
            config.reply_delay = Duration::from_millis(ms);
        }
        if let Some(timeout) = parse_positive_ms(&lookup, "CHAT_WIDGET_REPLY_TIMEOUT_MS")? {
            config.reply_timeout = timeout;
        }
        if let Some(ttl) = parse_positive_ms(&lookup, "CHAT_WIDGET_IDLE_TTL_MS")? {
            config.idle_ttl = ttl;
        }
        if let Some(position) = parse_var(&lookup, "CHAT_WIDGET_POSITION")? {
            config.appearance.position = position;
        }
        if let Some(size) = parse_var(&lookup, "CHAT_WIDGET_SIZE")? {
            config.appearance.size = size;
        }
        if let Some(seed) = parse_var(&lookup, "CHAT_WIDGET_SEED")? {
            config.seed_conversation = seed;
        }
        if let Some(text) = lookup("CHAT_WIDGET_REPLY_TEXT") {
            if text.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: "CHAT_WIDGET_REPLY_TEXT",
                    value: text,
                    reason: "reply text cannot be blank".to_string(),
                });
            }
            config.reply_text = text;
        }

        Ok(config)
    }

    /// Messages a new widget starts with
    pub fn seed_messages(&self) -> Vec<Message> {
        if !self.seed_conversation {
            return Vec::new();
        }
        vec![
            Message::agent(
                1,
                "مرحباً بك في بي ستايل! أنا هنا لمساعدتك في أي استفسار حول خدماتنا ومنتجاتنا. كيف يمكنني مساعدتك اليوم؟",
            ),
            Message::user(2, "أريد معرفة المزيد عن خدمات التصميم المتاحة لديكم"),
            Message::agent(
                3,
                "ممتاز! نحن نقدم مجموعة واسعة من خدمات التصميم بما في ذلك تصميم الهوية البصرية، تصميم المواقع الإلكترونية، والتصميم الجرافيكي. هل تود معرفة تفاصيل أكثر عن خدمة معينة؟",
            ),
        ]
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}

fn parse_positive_ms(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    match parse_var::<u64>(lookup, var)? {
        Some(0) => Err(ConfigError::InvalidValue {
            var,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        ms => Ok(ms.map(Duration::from_millis)),
    }
}
