use concentration_core::Mode;

/// Color scheme, dark while playing hard mode.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const ATTR_NAME: &'static str = "data-theme";

    pub(crate) const fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Normal => Self::Light,
            Mode::Hard => Self::Dark,
        }
    }

    pub(crate) const fn scheme(self) -> &'static str {
        use Theme::*;
        match self {
            Light => "light",
            Dark => "dark",
        }
    }

    pub(crate) fn apply(self) {
        use gloo::utils::document;
        let Some(html) = document().document_element() else {
            log::error!("failed to set theme: no document element");
            return;
        };
        let scheme = self.scheme();
        log::debug!("theme-scheme: {}", scheme);
        if let Err(err) = html.set_attribute(Self::ATTR_NAME, scheme) {
            log::error!("failed to set theme: {:?}", err);
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::Light
    }
}
