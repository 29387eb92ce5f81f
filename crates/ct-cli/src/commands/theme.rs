//! Theme command: show, set, or toggle the colour theme.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use ct_core::Theme;

use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Theme to switch to: light or dark.
    pub theme: Option<Theme>,

    /// Switch to the other theme.
    #[arg(long, conflicts_with = "theme")]
    pub toggle: bool,
}

pub fn run<W: Write>(writer: &mut W, ctx: &mut AppContext, args: &ThemeArgs) -> Result<()> {
    let requested = if args.toggle {
        Some(ctx.theme().toggled())
    } else {
        args.theme
    };

    match requested {
        Some(theme) => {
            ctx.set_theme(theme)?;
            tracing::debug!(%theme, "theme saved");
            writeln!(writer, "Theme set to {theme}")?;
        }
        None => writeln!(writer, "Theme: {}", ctx.theme())?,
    }
    Ok(())
}
