//! Page rendering: navigation, templates and the label style table.

use minijinja::Environment;
use serde::Serialize;

use crate::constants::PREVIEW_WIDTH;
use crate::models::ClassLabel;

/// The four navigation targets. Exactly one is active per response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Detection,
    History,
    About,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Detection, Page::History, Page::About];

    pub fn path(self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Detection => "/detect",
            Page::History => "/history",
            Page::About => "/about",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Detection => "Detection",
            Page::History => "History",
            Page::About => "About",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Page::Home => "🏠",
            Page::Detection => "🤖",
            Page::History => "🕘",
            Page::About => "👤",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Page::Home => "home.html",
            Page::Detection => "detection.html",
            Page::History => "history.html",
            Page::About => "about.html",
        }
    }
}

/// How a verdict is drawn on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelStyle {
    pub color: &'static str,
    /// Name of the animation served under `/animations/{name}.json`
    pub animation: &'static str,
}

// Indexed like `ClassLabel::BY_INDEX`
const LABEL_STYLES: [LabelStyle; 2] = [
    LabelStyle {
        color: "blue",
        animation: "ai",
    },
    LabelStyle {
        color: "green",
        animation: "human",
    },
];

pub fn label_style(label: ClassLabel) -> LabelStyle {
    LABEL_STYLES[label.index()]
}

/// A label plus its style, as templates see it
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    pub label: ClassLabel,
    pub color: &'static str,
    pub animation_url: String,
}

impl From<ClassLabel> for Verdict {
    fn from(label: ClassLabel) -> Self {
        let style = label_style(label);
        Self {
            label,
            color: style.color,
            animation_url: format!("/animations/{}.json", style.animation),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Inline message shown above page content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct NavItem {
    title: &'static str,
    path: &'static str,
    icon: &'static str,
    active: bool,
}

#[derive(Serialize)]
struct Layout<'a, T: Serialize> {
    page_title: &'static str,
    nav: Vec<NavItem>,
    preview_width: u32,
    #[serde(flatten)]
    body: &'a T,
}

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("home.html", include_str!("../templates/home.html"))?;
        env.add_template("detection.html", include_str!("../templates/detection.html"))?;
        env.add_template("history.html", include_str!("../templates/history.html"))?;
        env.add_template("about.html", include_str!("../templates/about.html"))?;
        Ok(Self { env })
    }

    /// Render `page` with `body` merged into the shared layout context
    pub fn render<T: Serialize>(&self, page: Page, body: &T) -> Result<String, minijinja::Error> {
        let nav = Page::ALL
            .iter()
            .map(|&p| NavItem {
                title: p.title(),
                path: p.path(),
                icon: p.icon(),
                active: p == page,
            })
            .collect();

        let ctx = Layout {
            page_title: page.title(),
            nav,
            preview_width: PREVIEW_WIDTH,
            body,
        };

        self.env.get_template(page.template())?.render(ctx)
    }
}
