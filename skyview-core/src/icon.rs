const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Pixel density variants published by the icon CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconScale {
    X1,
    #[default]
    X2,
    X4,
}

impl IconScale {
    fn suffix(&self) -> &'static str {
        match self {
            IconScale::X1 => "",
            IconScale::X2 => "@2x",
            IconScale::X4 => "@4x",
        }
    }
}

/// URL of the double-density icon for `icon_id`, e.g. `10d`.
pub fn icon_url(icon_id: &str) -> Option<String> {
    icon_url_with_scale(icon_id, IconScale::default())
}

pub fn icon_url_with_scale(icon_id: &str, scale: IconScale) -> Option<String> {
    let id = icon_id.trim();
    if id.is_empty() {
        return None;
    }
    Some(format!("{ICON_BASE_URL}/{id}{}.png", scale.suffix()))
}
