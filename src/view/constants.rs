//! Layout dimension constants for TUI rendering.
//!
//! Centralized location for all layout-related numeric values to enable
//! consistent tuning across the application.

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Height of the composer (border + one input line).
pub const COMPOSER_HEIGHT: u16 = 3;

/// Width of the session sidebar in columns, borders included.
pub const SIDEBAR_WIDTH: u16 = 34;

/// Columns taken by the role gutter in front of every bubble row.
pub const BUBBLE_GUTTER: u16 = 2;

/// Width of a toast, borders included.
pub const TOAST_WIDTH: u16 = 44;

/// Width percentage for help overlay popup.
pub const HELP_POPUP_WIDTH_PERCENT: u16 = 70;

/// Height percentage for help overlay popup.
pub const HELP_POPUP_HEIGHT_PERCENT: u16 = 80;

/// Width of the settings and confirmation dialogs.
pub const DIALOG_WIDTH: u16 = 56;
