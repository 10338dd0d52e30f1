//! Theme command handler.

use anyhow::Result;
use globalize_core::prefs::Theme;

use super::open_store;

pub fn run(value: Option<&str>) -> Result<()> {
    let mut store = open_store()?;
    let theme = match value {
        None => Theme::load(&store),
        Some(v) if v.eq_ignore_ascii_case("toggle") => Theme::toggle(&mut store)?,
        Some(v) => {
            let theme: Theme = v.parse()?;
            theme.save(&mut store)?;
            theme
        }
    };
    println!("Theme: {theme}");
    Ok(())
}
