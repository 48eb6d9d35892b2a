//! System tray icon acting as the voice input button.
//!
//! The icon and tooltip show the current button face; the context menu holds
//! the toggle itself plus Open Site, Clear Prompt and Exit.

use crate::{AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use scribe_gate_core::{ButtonFace, ButtonIcon};
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Edge length of the generated tray icons, in pixels.
pub(crate) const ICON_SIZE: u32 = 32;

const IDLE_FILL: Rgba<u8> = Rgba([72, 76, 84, 255]);
const RECORDING_FILL: Rgba<u8> = Rgba([211, 47, 47, 255]);
const GLYPH: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Menu item ids the async runtime reacts to.
#[derive(Debug, Clone)]
pub struct TrayMenuIds {
    /// Toggles voice input; its label follows the button face.
    pub toggle: MenuId,
    /// Opens the configured site.
    pub open_site: MenuId,
    /// Empties the prompt.
    pub clear_prompt: MenuId,
    /// Quits the application.
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    toggle_item: MenuItem,
    ids: TrayMenuIds,
}

impl TrayManager {
    /// Create the tray icon showing the idle face.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let toggle_item = MenuItem::new(ButtonFace::IDLE.label, true, None);
        let open_site_item = MenuItem::new("Open Site", true, None);
        let clear_item = MenuItem::new("Clear Prompt", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let ids = TrayMenuIds {
            toggle: toggle_item.id().clone(),
            open_site: open_site_item.id().clone(),
            clear_prompt: clear_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        menu.append_items(&[
            &toggle_item,
            &PredefinedMenuItem::separator(),
            &open_site_item,
            &clear_item,
            &PredefinedMenuItem::separator(),
            &exit_item,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(tooltip(&ButtonFace::IDLE))
            .with_menu(Box::new(menu))
            .with_icon(Self::load_icon(&ButtonFace::IDLE)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            toggle_item,
            ids,
        })
    }

    /// Show `face` on the icon, tooltip and toggle item.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn render(&mut self, face: &ButtonFace) -> AppResult<()> {
        self.tray_icon
            .set_icon(Some(Self::load_icon(face)?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(tooltip(face)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.toggle_item.set_text(face.label);

        Ok(())
    }

    /// Hide the tray icon.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn hide(&mut self) -> AppResult<()> {
        self.tray_icon
            .set_visible(false)
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to hide tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Tray icon hidden");

        Ok(())
    }

    /// Menu item ids.
    pub fn menu_ids(&self) -> &TrayMenuIds {
        &self.ids
    }

    #[track_caller]
    fn load_icon(face: &ButtonFace) -> AppResult<Icon> {
        let rgba = icon_image(face);
        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

pub(crate) fn tooltip(face: &ButtonFace) -> String {
    format!("Scribe Gate - {}", face.label)
}

/// Draw the icon for `face`: a filled disc, grey when idle and red while
/// recording, with a microphone capsule or a stop square on top.
pub(crate) fn icon_image(face: &ButtonFace) -> RgbaImage {
    let fill = if face.recording {
        RECORDING_FILL
    } else {
        IDLE_FILL
    };
    let centre = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0;

    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let (dx, dy) = (x as f32 - centre, y as f32 - centre);
        if dx * dx + dy * dy > radius * radius {
            return TRANSPARENT;
        }

        let on_glyph = match face.icon {
            ButtonIcon::Microphone => {
                // Capsule 8px wide, 14px tall, plus a 2px stand below it.
                (dx.abs() <= 4.0 && (-9.0..=5.0).contains(&dy))
                    || (dx.abs() <= 1.0 && (5.0..=10.0).contains(&dy))
            }
            ButtonIcon::Stop => dx.abs() <= 6.0 && dy.abs() <= 6.0,
        };

        if on_glyph { GLYPH } else { fill }
    })
}
