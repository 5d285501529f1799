//! Named dimension presets.
//!
//! A fixed table of common target sizes (social media, print, documents,
//! scale factors) grouped by [`Unit`]. The table is static data; lookups are
//! linear scans, which is fine for ~70 entries.

use crate::imaging::{TransformSettings, Unit};
use serde::Serialize;

/// A named target size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub width: f64,
    pub height: f64,
    pub category: &'static str,
    pub unit: Unit,
}

impl Preset {
    /// Copy this preset's dimensions and unit into `settings`.
    pub fn apply(&self, settings: &mut TransformSettings) {
        settings.width = self.width;
        settings.height = self.height;
        settings.unit = self.unit;
    }
}

const fn preset(
    name: &'static str,
    width: f64,
    height: f64,
    category: &'static str,
    unit: Unit,
) -> Preset {
    Preset {
        name,
        width,
        height,
        category,
        unit,
    }
}

static PRESETS: &[Preset] = &[
    preset("A4 Size", 2480.0, 3508.0, "Document", Unit::Pixel),
    preset("Book Cover", 1600.0, 2560.0, "Print", Unit::Pixel),
    preset("Business Card", 1050.0, 600.0, "Print", Unit::Pixel),
    preset("CD Cover", 1417.0, 1417.0, "Print", Unit::Pixel),
    preset("Ebook Cover", 1600.0, 2400.0, "Digital", Unit::Pixel),
    preset("Email Header", 600.0, 200.0, "Email", Unit::Pixel),
    preset("Etsy Cover Photo", 3360.0, 840.0, "E-commerce", Unit::Pixel),
    preset("Facebook Cover", 1920.0, 1080.0, "Social Media", Unit::Pixel),
    preset("Facebook Post", 1200.0, 630.0, "Social Media", Unit::Pixel),
    preset("Facebook Story", 1080.0, 1920.0, "Social Media", Unit::Pixel),
    preset("Flyer (A5)", 1748.0, 2480.0, "Print", Unit::Pixel),
    preset("Flyer (US Letter)", 2550.0, 3300.0, "Print", Unit::Pixel),
    preset("Instagram Post", 1080.0, 1080.0, "Social Media", Unit::Pixel),
    preset("Instagram Story", 1080.0, 1920.0, "Social Media", Unit::Pixel),
    preset("LinkedIn Post", 1200.0, 627.0, "Social Media", Unit::Pixel),
    preset("LinkedIn Profile Banner", 1584.0, 396.0, "Social Media", Unit::Pixel),
    preset("Pinterest Pin", 1000.0, 1500.0, "Social Media", Unit::Pixel),
    preset("Podcast Cover", 3000.0, 3000.0, "Audio", Unit::Pixel),
    preset("Poster (Large)", 3300.0, 5100.0, "Print", Unit::Pixel),
    preset("Poster (Small)", 2550.0, 3300.0, "Print", Unit::Pixel),
    preset("Presentation Slide (16:9)", 1920.0, 1080.0, "Presentation", Unit::Pixel),
    preset("Presentation Slide (4:3)", 1024.0, 768.0, "Presentation", Unit::Pixel),
    preset("Product Thumbnail", 800.0, 800.0, "E-commerce", Unit::Pixel),
    preset("Resume (A4)", 2480.0, 3508.0, "Document", Unit::Pixel),
    preset("Snapchat Geofilter", 1080.0, 1920.0, "Social Media", Unit::Pixel),
    preset("Story Highlight Cover", 1080.0, 1920.0, "Social Media", Unit::Pixel),
    preset("TikTok Video", 1080.0, 1920.0, "Social Media", Unit::Pixel),
    preset("Tumblr Banner", 3000.0, 1055.0, "Social Media", Unit::Pixel),
    preset("Twitter Header", 1500.0, 500.0, "Social Media", Unit::Pixel),
    preset("Twitter Post", 1200.0, 675.0, "Social Media", Unit::Pixel),
    preset("US Letter Document", 2550.0, 3300.0, "Document", Unit::Pixel),
    preset("Wallpaper (Desktop)", 1920.0, 1080.0, "Desktop", Unit::Pixel),
    preset("Wallpaper (Mobile)", 1080.0, 1920.0, "Mobile", Unit::Pixel),
    preset("Web Banner (Large)", 1600.0, 500.0, "Web", Unit::Pixel),
    preset("Web Banner (Medium)", 728.0, 90.0, "Web", Unit::Pixel),
    preset("Web Banner (Small)", 468.0, 60.0, "Web", Unit::Pixel),
    preset("Website Hero Image", 1920.0, 1080.0, "Web", Unit::Pixel),
    preset("YouTube Channel Art", 2560.0, 1440.0, "Video", Unit::Pixel),
    preset("YouTube Thumbnail", 1280.0, 720.0, "Video", Unit::Pixel),
    preset("Zoom Virtual Background", 1920.0, 1080.0, "Video Call", Unit::Pixel),
    preset("App Screenshot (iOS)", 1242.0, 2688.0, "Mobile App", Unit::Pixel),
    preset("App Screenshot (Android)", 1080.0, 2400.0, "Mobile App", Unit::Pixel),
    preset("Web Icon (Small)", 64.0, 64.0, "Icon", Unit::Pixel),
    preset("Web Icon (Medium)", 128.0, 128.0, "Icon", Unit::Pixel),
    preset("Web Icon (Large)", 256.0, 256.0, "Icon", Unit::Pixel),
    preset("Ad Banner (Leaderboard)", 728.0, 90.0, "Advertisement", Unit::Pixel),
    preset("Ad Banner (Skyscraper)", 160.0, 600.0, "Advertisement", Unit::Pixel),
    preset("Ad Banner (Square)", 250.0, 250.0, "Advertisement", Unit::Pixel),
    preset("A4 Size", 21.0, 29.7, "Document", Unit::Centimeter),
    preset("A3 Size", 29.7, 42.0, "Document", Unit::Centimeter),
    preset("A5 Size", 14.8, 21.0, "Document", Unit::Centimeter),
    preset("Business Card", 8.9, 5.1, "Print", Unit::Centimeter),
    preset("Photo 4x6", 10.2, 15.2, "Photo", Unit::Centimeter),
    preset("Photo 5x7", 12.7, 17.8, "Photo", Unit::Centimeter),
    preset("Photo 8x10", 20.3, 25.4, "Photo", Unit::Centimeter),
    preset("A4 Size", 210.0, 297.0, "Document", Unit::Millimeter),
    preset("A3 Size", 297.0, 420.0, "Document", Unit::Millimeter),
    preset("A5 Size", 148.0, 210.0, "Document", Unit::Millimeter),
    preset("Business Card", 89.0, 51.0, "Print", Unit::Millimeter),
    preset("Credit Card", 85.6, 53.98, "Card", Unit::Millimeter),
    preset("A4 Size", 8.27, 11.69, "Document", Unit::Inch),
    preset("US Letter", 8.5, 11.0, "Document", Unit::Inch),
    preset("Business Card", 3.5, 2.0, "Print", Unit::Inch),
    preset("Photo 4x6", 4.0, 6.0, "Photo", Unit::Inch),
    preset("Photo 5x7", 5.0, 7.0, "Photo", Unit::Inch),
    preset("Photo 8x10", 8.0, 10.0, "Photo", Unit::Inch),
    preset("50% Scale", 50.0, 50.0, "Scale", Unit::Percent),
    preset("75% Scale", 75.0, 75.0, "Scale", Unit::Percent),
    preset("125% Scale", 125.0, 125.0, "Scale", Unit::Percent),
    preset("150% Scale", 150.0, 150.0, "Scale", Unit::Percent),
    preset("200% Scale", 200.0, 200.0, "Scale", Unit::Percent),
];

/// Quick picks shown before the full table.
static BASIC_PRESETS: &[Preset] = &[
    preset("Instagram Post", 1080.0, 1080.0, "Social Media", Unit::Pixel),
    preset("YouTube Thumbnail", 1280.0, 720.0, "Video", Unit::Pixel),
    preset("Facebook Post", 1200.0, 630.0, "Social Media", Unit::Pixel),
    preset("Profile Picture", 800.0, 800.0, "Social Media", Unit::Pixel),
];

/// Every preset, grouped by unit in table order.
pub fn all_presets() -> &'static [Preset] {
    PRESETS
}

pub fn basic_presets() -> &'static [Preset] {
    BASIC_PRESETS
}

/// Presets expressed in `unit`.
pub fn presets_for_unit(unit: Unit) -> impl Iterator<Item = &'static Preset> {
    PRESETS.iter().filter(move |p| p.unit == unit)
}

/// Look up a preset by name, case-insensitively.
///
/// Several names exist in more than one unit (e.g. "A4 Size"); `unit`
/// picks one, otherwise the first match in table order (pixels first) wins.
/// The basic presets are searched after the main table.
pub fn find_preset(name: &str, unit: Option<Unit>) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS
        .iter()
        .chain(BASIC_PRESETS)
        .filter(|p| unit.is_none_or(|u| p.unit == u))
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sizes_per_unit() {
        assert_eq!(presets_for_unit(Unit::Pixel).count(), 48);
        assert_eq!(presets_for_unit(Unit::Centimeter).count(), 7);
        assert_eq!(presets_for_unit(Unit::Millimeter).count(), 5);
        assert_eq!(presets_for_unit(Unit::Inch).count(), 6);
        assert_eq!(presets_for_unit(Unit::Percent).count(), 5);
        assert_eq!(all_presets().len(), 71);
    }

    #[test]
    fn every_preset_is_positive() {
        for p in all_presets().iter().chain(basic_presets()) {
            assert!(p.width > 0.0 && p.height > 0.0, "{}", p.name);
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        let p = find_preset("instagram story", None).unwrap();
        assert_eq!((p.width, p.height), (1080.0, 1920.0));
    }

    #[test]
    fn find_prefers_pixels_without_unit() {
        let p = find_preset("A4 Size", None).unwrap();
        assert_eq!(p.unit, Unit::Pixel);
        assert_eq!((p.width, p.height), (2480.0, 3508.0));
    }

    #[test]
    fn find_with_unit_picks_that_table() {
        let p = find_preset("A4 Size", Some(Unit::Millimeter)).unwrap();
        assert_eq!((p.width, p.height), (210.0, 297.0));
        assert!(find_preset("Instagram Post", Some(Unit::Inch)).is_none());
    }

    #[test]
    fn find_falls_back_to_basic_presets() {
        let p = find_preset("Profile Picture", None).unwrap();
        assert_eq!((p.width, p.height), (800.0, 800.0));
    }

    #[test]
    fn apply_sets_dimensions_and_unit() {
        let mut settings = TransformSettings::default();
        find_preset("50% Scale", None).unwrap().apply(&mut settings);
        assert_eq!(settings.unit, Unit::Percent);
        assert_eq!((settings.width, settings.height), (50.0, 50.0));
    }
}
