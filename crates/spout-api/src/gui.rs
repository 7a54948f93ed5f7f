//! GUI widget and screen model.
//!
//! Screens are trees of widgets owned by one player. Drawing them is the
//! client's job; the server only tracks what is attached and visible.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Kinds of widget a client knows how to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetType {
    Label,
    Button,
    Texture,
    TextField,
    Slider,
    CheckBox,
    RadioButton,
    Container,
    Gradient,
    ItemWidget,
    ListWidget,
    GenericScreen,
    PopupScreen,
    OverlayScreen,
    InGameScreen,
}

/// Built-in client screens an overlay can be drawn over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenType {
    GameScreen,
    ChatScreen,
    CustomScreen,
    PlayerInventory,
    ChestInventory,
    DispenserInventory,
    FurnaceInventory,
    IngameMenu,
    OptionsMenu,
    VideoSettingsMenu,
    ControlsMenu,
    AchievementsScreen,
    StatisticsScreen,
    WorkbenchInventory,
    SignScreen,
    GameOverScreen,
    SleepScreen,
    UnknownScreen,
}

impl ScreenType {
    const KNOWN: [ScreenType; 17] = [
        ScreenType::GameScreen,
        ScreenType::ChatScreen,
        ScreenType::CustomScreen,
        ScreenType::PlayerInventory,
        ScreenType::ChestInventory,
        ScreenType::DispenserInventory,
        ScreenType::FurnaceInventory,
        ScreenType::IngameMenu,
        ScreenType::OptionsMenu,
        ScreenType::VideoSettingsMenu,
        ScreenType::ControlsMenu,
        ScreenType::AchievementsScreen,
        ScreenType::StatisticsScreen,
        ScreenType::WorkbenchInventory,
        ScreenType::SignScreen,
        ScreenType::GameOverScreen,
        ScreenType::SleepScreen,
    ];

    /// Wire code. `UnknownScreen` is `-1`.
    pub fn code(self) -> i32 {
        Self::KNOWN
            .iter()
            .position(|&t| t == self)
            .map_or(-1, |i| i as i32)
    }

    /// Inverse of [`code`](Self::code); unrecognised codes map to `UnknownScreen`.
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::KNOWN.get(i).copied())
            .unwrap_or(ScreenType::UnknownScreen)
    }
}

/// Server-unique widget handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WidgetId(u32);

impl WidgetId {
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        WidgetId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Something that can be shown on a client screen.
pub trait Widget: Send + Sync {
    fn widget_type(&self) -> WidgetType;

    fn id(&self) -> WidgetId;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);
}

/// A widget that holds other widgets and belongs to one player.
pub trait Screen: Widget {
    /// Entity id of the player this screen is shown to.
    fn player_id(&self) -> i32;

    fn attach_widget(&mut self, widget: Box<dyn Widget>) -> WidgetId;

    fn remove_widget(&mut self, id: WidgetId) -> Option<Box<dyn Widget>>;

    fn widgets(&self) -> &[Box<dyn Widget>];

    fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets()
            .iter()
            .find(|w| w.id() == id)
            .map(|w| w.as_ref())
    }
}

/// A screen drawn on top of one of the client's built-in screens.
pub trait OverlayScreen: Screen {
    fn screen_type(&self) -> ScreenType;
}

/// Plain text.
#[derive(Debug, Clone)]
pub struct GenericLabel {
    id: WidgetId,
    text: String,
    visible: bool,
}

impl GenericLabel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: WidgetId::next(),
            text: text.into(),
            visible: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for GenericLabel {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Label
    }

    fn id(&self) -> WidgetId {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Screen holding an ordered list of widgets.
pub struct GenericScreen {
    id: WidgetId,
    player_id: i32,
    visible: bool,
    widgets: Vec<Box<dyn Widget>>,
}

impl GenericScreen {
    pub fn new(player_id: i32) -> Self {
        Self {
            id: WidgetId::next(),
            player_id,
            visible: true,
            widgets: Vec::new(),
        }
    }
}

impl Widget for GenericScreen {
    fn widget_type(&self) -> WidgetType {
        WidgetType::GenericScreen
    }

    fn id(&self) -> WidgetId {
        self.id
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl Screen for GenericScreen {
    fn player_id(&self) -> i32 {
        self.player_id
    }

    fn attach_widget(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let id = widget.id();
        self.widgets.retain(|w| w.id() != id);
        self.widgets.push(widget);
        id
    }

    fn remove_widget(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        let index = self.widgets.iter().position(|w| w.id() == id)?;
        Some(self.widgets.remove(index))
    }

    fn widgets(&self) -> &[Box<dyn Widget>] {
        &self.widgets
    }
}

/// [`GenericScreen`] shown over a built-in client screen.
pub struct GenericOverlayScreen {
    screen: GenericScreen,
    screen_type: ScreenType,
}

impl GenericOverlayScreen {
    pub fn new(player_id: i32, screen_type: ScreenType) -> Self {
        Self {
            screen: GenericScreen::new(player_id),
            screen_type,
        }
    }
}

impl Widget for GenericOverlayScreen {
    fn widget_type(&self) -> WidgetType {
        WidgetType::OverlayScreen
    }

    fn id(&self) -> WidgetId {
        self.screen.id()
    }

    fn is_visible(&self) -> bool {
        self.screen.is_visible()
    }

    fn set_visible(&mut self, visible: bool) {
        self.screen.set_visible(visible);
    }
}

impl Screen for GenericOverlayScreen {
    fn player_id(&self) -> i32 {
        self.screen.player_id()
    }

    fn attach_widget(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        self.screen.attach_widget(widget)
    }

    fn remove_widget(&mut self, id: WidgetId) -> Option<Box<dyn Widget>> {
        self.screen.remove_widget(id)
    }

    fn widgets(&self) -> &[Box<dyn Widget>] {
        self.screen.widgets()
    }
}

impl OverlayScreen for GenericOverlayScreen {
    fn screen_type(&self) -> ScreenType {
        self.screen_type
    }
}
