use crate::config::{CatalogConfig, SubstratumConfig};

const ACCENTS: &[&str] = &[
    "red",
    "pink",
    "purple",
    "deeppurple",
    "indigo",
    "blue",
    "lightblue",
    "cyan",
    "teal",
    "green",
    "lightgreen",
    "lime",
    "yellow",
    "amber",
    "orange",
    "deeporange",
    "brown",
    "grey",
    "bluegrey",
];

const DARK_BUNDLE: &[&str] = &[
    "com.android.system.theme.dark",
    "com.android.settings.theme.dark",
    "com.android.dui.theme.dark",
    "com.android.settings.gboard.dark",
    "com.android.updater.theme.dark",
];

const BLACK_BUNDLE: &[&str] = &[
    "com.android.system.theme.blackaf",
    "com.android.settings.theme.blackaf",
    "com.android.dui.theme.blackaf",
    "com.android.settings.gboard.blackaf",
    "com.android.updater.theme.blackaf",
];

const CLOCKS: &str = "default,bubble,bubble_colored,sammy,sammy_bold,\
com.android.systemui.clock.analog.oneplus,\
com.android.systemui.clock.analog.pixel,\
com.android.systemui.clock.analog.minimal,\
com.android.systemui.clock.analog.dots";

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            accent_prefix: "com.accents.".to_string(),
            accents: owned(ACCENTS),
            black_accent: "black".to_string(),
            white_accent: "white".to_string(),
            dark_bundle: owned(DARK_BUNDLE),
            black_bundle: owned(BLACK_BUNDLE),
            stock_dark: "com.android.systemui.theme.dark".to_string(),
            clocks: CLOCKS.to_string(),
        }
    }
}

impl Default for SubstratumConfig {
    fn default() -> Self {
        Self {
            target: "android".to_string(),
            metadata_key: "Substratum_Version".to_string(),
            allowlist: vec!["android.auto_generated_rro_".to_string()],
        }
    }
}
