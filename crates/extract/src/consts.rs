use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Catalog prefixes used by the storefront for individual works.
const ID_PREFIX: &str = "(?:RJ|RE|BJ|VJ)";
/// Work codes are either six or (for newer works) eight digits.
const ID_DIGITS: &str = r"(?:\d{8}|\d{6})";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(WORK_ID_EXACT_REGEX, format!(r"^{}{}$", ID_PREFIX, ID_DIGITS).as_str());
// The regex crate has no look-around, so the boundaries are consumed and the
// code itself is captured.
regex!(WORK_ID_SEARCH_REGEX, format!(r"(?:^|[^0-9A-Za-z])({}{})(?:$|[^0-9])", ID_PREFIX, ID_DIGITS).as_str());
selector!(WORK_NAME_SELECTOR, "#work_name");
selector!(MAKER_SELECTOR, "#work_maker .maker_name a");
selector!(OUTLINE_ROW_SELECTOR, "#work_outline tr");
selector!(TH_SELECTOR, "th");
selector!(TD_SELECTOR, "td");
selector!(ANCHOR_SELECTOR, "a");
pub(crate) const SERIES_LABEL: &str = "シリーズ名";
