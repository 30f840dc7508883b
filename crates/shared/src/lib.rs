use serde::{Deserialize, Serialize};

pub mod config;
pub mod input;

pub use input::{parse_positive_input, InputError};

/// Вершина фигуры в локальных координатах (x, y, z)
pub type Vertex = [f32; 3];

/// Цвет в формате 0xRRGGBB
pub type ColorHex = u32;

/// Тип фигуры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Line,
    Area,
    Volume,
}

impl ShapeKind {
    /// Минимальное количество вершин для этого типа
    pub fn min_vertices(&self) -> usize {
        match self {
            ShapeKind::Line => 2,
            ShapeKind::Area | ShapeKind::Volume => 3,
        }
    }

    /// Area и Volume всегда замкнуты, независимо от флага close_line
    pub fn is_implicitly_closed(&self) -> bool {
        !matches!(self, ShapeKind::Line)
    }

    pub fn all() -> &'static [ShapeKind] {
        &[ShapeKind::Line, ShapeKind::Area, ShapeKind::Volume]
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeKind::Line => write!(f, "line"),
            ShapeKind::Area => write!(f, "area"),
            ShapeKind::Volume => write!(f, "volume"),
        }
    }
}

/// Слой фигуры, которому назначается цвет
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorLayer {
    Line,
    Area,
    Volume,
}

/// Флаги отображения контура и площади поверх объёма
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Показывать линию контура для Area и Volume
    pub always_show_line: bool,
    /// Показывать площадь (основание) для Volume
    pub always_show_area: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            always_show_line: true,
            always_show_area: true,
        }
    }
}

/// Стиль фигуры: цвета слоёв и высота объёма
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub line_color: ColorHex,
    /// Если не задан, используется цвет линии
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_color: Option<ColorHex>,
    /// Если не задан, берётся цвет площади, затем цвет линии
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_color: Option<ColorHex>,
    /// Знаковая высота выдавливания
    pub volume_height: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            line_color: config::LINE_COLOR,
            area_color: None,
            volume_color: None,
            volume_height: config::DEFAULT_VOLUME_HEIGHT,
        }
    }
}

impl ShapeStyle {
    /// Итоговый цвет слоя с учётом цепочки подстановок
    pub fn color(&self, layer: ColorLayer) -> ColorHex {
        match layer {
            ColorLayer::Line => self.line_color,
            ColorLayer::Area => self.area_color.unwrap_or(self.line_color),
            ColorLayer::Volume => self
                .volume_color
                .or(self.area_color)
                .unwrap_or(self.line_color),
        }
    }

    pub fn set_color(&mut self, layer: ColorLayer, color: ColorHex) {
        match layer {
            ColorLayer::Line => self.line_color = color,
            ColorLayer::Area => self.area_color = Some(color),
            ColorLayer::Volume => self.volume_color = Some(color),
        }
    }
}

/// Параметры создания фигуры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ShapeOptions {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub close_line: bool,
    #[serde(default)]
    pub style: ShapeStyle,
    #[serde(default)]
    pub appearance: Appearance,
    /// Призрачная фигура (предпросмотр при создании)
    #[serde(default)]
    pub ghost: bool,
}

/// Режим гизмо для всей фигуры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

/// Пространство осей гизмо
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpace {
    #[default]
    World,
    Local,
}

/// Шаги привязки. None: привязка выключена
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Snaps {
    #[serde(default)]
    pub translation: Option<f32>,
    /// Шаг поворота в радианах
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default)]
    pub scale: Option<f32>,
}

/// Параметры контролов редактирования фигуры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlsParams {
    /// Центр гизмо в центре вершин (только translate)
    pub center_gizmo: bool,
    pub drag_vertices: bool,
    /// Показывать маркеры середин рёбер
    pub allow_creating_new_vertices: bool,
    pub show_length_labels: bool,
    pub show_angle_labels: bool,
}

impl Default for ControlsParams {
    fn default() -> Self {
        Self {
            center_gizmo: true,
            drag_vertices: true,
            allow_creating_new_vertices: true,
            show_length_labels: true,
            show_angle_labels: true,
        }
    }
}

/// Перевести 0xRRGGBB в RGB [0..1]
pub fn hex_to_rgb(color: ColorHex) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32 / 255.0,
        ((color >> 8) & 0xff) as f32 / 255.0,
        (color & 0xff) as f32 / 255.0,
    ]
}
