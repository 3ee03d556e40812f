//! HTML markup for the widget page
//!
//! Rendered server-side with leptos `view!`, which escapes text and
//! attribute values, so message content is written as-is.

use super::classes::{
    bubble_class, bubble_message_class, container_class, launcher_class, panel_class,
};
use crate::config::{Branding, ComposerText, SocialLink, WidgetConfig};
use crate::runtime::WidgetSnapshot;
use crate::state_machine::{Message, Sender};
use leptos::prelude::*;

const LAUNCHER_ICON: &str = "💬";
const CLOSE_ICON: &str = "✕";
const FONT_STYLESHEET: &str =
    "https://fonts.googleapis.com/css2?family=Tajawal:wght@400;700&display=swap";

/// Render the complete page hosting one widget
pub fn render_page(snapshot: &WidgetSnapshot, config: &WidgetConfig) -> String {
    let page = view! {
        <html lang="ar" dir="rtl">
            <head>
                <meta charset="utf-8" />
                <meta name="viewport" content="width=device-width,initial-scale=1" />
                <title>{config.branding.bot_name.clone()}</title>
                <link rel="stylesheet" href=FONT_STYLESHEET />
            </head>
            <body
                class="h-screen bg-gradient-to-br from-blue-50 to-indigo-100 flex items-center justify-center p-4"
                style="font-family: Tajawal, sans-serif"
            >
                <WidgetShell
                    snapshot=snapshot.clone()
                    branding=config.branding.clone()
                    composer=config.composer.clone()
                />
                <script inner_html=reload_script(&snapshot.id)></script>
            </body>
        </html>
    };
    format!("<!DOCTYPE html>{}", page.to_html())
}

/// Reload when the visible page would change: the panel toggled, a user
/// message arrived from another tab, or the agent finished its turn.
fn reload_script(widget_id: &str) -> String {
    let stream_url = serde_json::json!(format!("/api/widgets/{widget_id}/stream"));
    format!(
        r#"const stream = new EventSource({stream_url});
const reload = () => window.location.reload();
stream.addEventListener("panel", reload);
stream.addEventListener("agent_done", reload);
stream.addEventListener("message", (event) => {{
  if (JSON.parse(event.data).message.sender === "user") reload();
}});"#
    )
}

#[component]
fn WidgetShell(
    snapshot: WidgetSnapshot,
    branding: Branding,
    composer: ComposerText,
) -> impl IntoView {
    let visibility = snapshot.visibility();
    let WidgetSnapshot {
        id,
        is_open,
        is_composing,
        messages,
        appearance,
        ..
    } = snapshot;
    let toggle_action = format!("/w/{id}/toggle");
    let chat_action = format!("/w/{id}/chat");

    view! {
        <div class=container_class(appearance.position)>
            <div dir="rtl" class=panel_class(appearance.position, appearance.size, visibility)>
                <ChatHeader branding=branding.clone() />
                <MessageList messages=messages is_composing=is_composing branding=branding />
                <Composer action=chat_action is_composing=is_composing composer=composer />
                // Close control for small screens where the panel covers the launcher
                <form
                    method="post"
                    action=toggle_action.clone()
                    class="absolute top-2 left-2 sm:hidden"
                >
                    <button type="submit" aria-label="close">{CLOSE_ICON}</button>
                </form>
            </div>
            <Launcher action=toggle_action is_open=is_open />
        </div>
    }
}

#[component]
fn ChatHeader(branding: Branding) -> impl IntoView {
    let Branding {
        bot_name,
        status,
        heading,
        subheading,
        links,
        ..
    } = branding;

    let links = links
        .into_iter()
        .map(|SocialLink { label, href, color }| {
            let aria_label = label.clone();
            view! {
                <a
                    href=href
                    target="_blank"
                    rel="noopener noreferrer"
                    class="hover:scale-110 transition-transform"
                    style=format!("color: {color}")
                    aria-label=aria_label
                >
                    {label}
                </a>
            }
        })
        .collect_view();

    view! {
        <div
            dir="rtl"
            class="relative flex items-center justify-center h-[80px] border-b overflow-hidden bg-gradient-to-r from-black via-gray-900 to-black rounded-t-lg"
        >
            <div class="relative z-10 flex items-center justify-between w-full px-4 py-3">
                <div class="flex items-center gap-3">{links}</div>
                <div class="flex flex-col text-right">
                    <h1 class="text-xl font-bold text-white tracking-wide drop-shadow-lg">
                        {bot_name}
                    </h1>
                    <div class="flex items-center gap-1.5 mt-0.5 justify-end">
                        <span class="text-sm text-white/90">{status}</span>
                        <span class="h-2.5 w-2.5 rounded-full bg-[#00C76F] animate-pulse"></span>
                    </div>
                </div>
            </div>
        </div>
        <div class="flex-col text-center justify-center py-2">
            <h2 class="text-xl font-semibold">{heading}</h2>
            <p class="text-sm text-muted-foreground">{subheading}</p>
        </div>
    }
}

#[component]
fn MessageList(messages: Vec<Message>, is_composing: bool, branding: Branding) -> impl IntoView {
    let bubbles = messages
        .into_iter()
        .map(|message| {
            let avatar = match message.sender {
                Sender::User => branding.user_avatar.clone(),
                Sender::Agent => branding.agent_avatar.clone(),
            };
            view! { <MessageBubble message=message avatar=avatar /> }
        })
        .collect_view();

    let typing = is_composing.then(|| {
        view! {
            <TypingIndicator avatar=branding.agent_avatar label=branding.typing_label />
        }
    });

    view! {
        <div class="flex-grow overflow-y-auto" dir="rtl">
            <div class="flex flex-col p-4">{bubbles} {typing}</div>
        </div>
    }
}

#[component]
fn Avatar(label: String) -> impl IntoView {
    view! {
        <span class="h-9 w-9 shrink-0 shadow-sm rounded-full flex items-center justify-center bg-gradient-to-br from-blue-500 to-purple-600 text-white text-xs font-semibold">
            {label}
        </span>
    }
}

#[component]
fn MessageBubble(message: Message, avatar: String) -> impl IntoView {
    let sender = message.sender;
    view! {
        <div
            class=bubble_class(sender)
            dir="rtl"
            data-message-id=message.id.to_string()
            data-sender=sender.as_str()
        >
            <Avatar label=avatar />
            <div class=bubble_message_class(sender)>
                <div class="break-words">{message.content}</div>
            </div>
        </div>
    }
}

#[component]
fn TypingIndicator(avatar: String, label: String) -> impl IntoView {
    view! {
        <div class=bubble_class(Sender::Agent) dir="rtl" data-typing="true">
            <Avatar label=avatar />
            <div class="max-w-[70%] bg-gray-50 rounded-2xl rounded-br-sm">
                <div class="flex items-center justify-end p-4">
                    <span class="animate-bounce">"•••"</span>
                    <span class="text-sm text-gray-500 mr-2">{label}</span>
                </div>
            </div>
        </div>
    }
}

#[component]
fn Composer(action: String, is_composing: bool, composer: ComposerText) -> impl IntoView {
    view! {
        <div class="border-t p-4" dir="rtl">
            <form method="post" action=action class="relative rounded-lg border bg-background p-1">
                <textarea
                    name="text"
                    required=true
                    placeholder=composer.placeholder
                    class="min-h-12 resize-none rounded-lg bg-background border-0 p-3 shadow-none"
                ></textarea>
                <div class="flex items-center p-3 pt-0 justify-between">
                    <button
                        type="submit"
                        class="gap-1.5 bg-black hover:bg-gray-800 text-white"
                        disabled=is_composing
                    >
                        {composer.send_label}
                    </button>
                    <div class="flex">
                        <button type="button" aria-label="microphone">"🎤"</button>
                        <button type="button" aria-label="attach">"📎"</button>
                    </div>
                </div>
            </form>
        </div>
    }
}

#[component]
fn Launcher(action: String, is_open: bool) -> impl IntoView {
    let icon = if is_open { CLOSE_ICON } else { LAUNCHER_ICON };
    view! {
        <form method="post" action=action>
            <button type="submit" class=launcher_class() data-open=is_open.to_string()>
                {icon}
            </button>
        </form>
    }
}
