use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownScreen;

pub const HEALTHY_ICON: &str = "/static/assets/check-svgrepo-com.svg";
pub const DISEASED_ICON: &str = "/static/assets/info-circle-svgrepo-com.svg";

const HEALTHY_DESCRIPTION: &str = "Congratulations! Your tomato plant looks healthy and shows no sign of \
fusarium wilt. Keep the plant in good condition with regular care.";
const DISEASED_DESCRIPTION: &str = "Warning! Your tomato plant shows symptoms of fusarium wilt infection. \
Take prevention and treatment measures as soon as possible.";

/// Mutually exclusive top-level views. The result modal is an overlay and is
/// not a member of this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Home,
    Loading,
}

impl Screen {
    pub const ALL: [Screen; 2] = [Screen::Home, Screen::Loading];

    pub fn element_id(self) -> &'static str {
        match self {
            Screen::Home => "home-screen",
            Screen::Loading => "loading-screen",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_id())
    }
}

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.element_id() == s)
            .ok_or_else(|| UnknownScreen(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
            color: None,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::for_label(&self.label)
    }

    /// Confidence as a percentage with two decimals, e.g. `87.34%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }

    pub fn has_valid_confidence(&self) -> bool {
        self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Diseased,
}

impl Verdict {
    pub fn for_label(label: &str) -> Self {
        if label.to_lowercase().contains("healthy") {
            Verdict::Healthy
        } else {
            Verdict::Diseased
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Verdict::Healthy => HEALTHY_ICON,
            Verdict::Diseased => DISEASED_ICON,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Verdict::Healthy => HEALTHY_DESCRIPTION,
            Verdict::Diseased => DISEASED_DESCRIPTION,
        }
    }
}
