//! Глобальные константы отображения и взаимодействия

use crate::ColorHex;

/// Вертикальное смещение площади и объёма над контуром
pub const Z_FIGHTING_OFFSET: f32 = 0.01;

/// Мировой размер маркера вершины
pub const VERTEX_SCALE: f32 = 1.0;

/// Масштаб подписей длины
pub const LABEL_SCALE: f32 = 1.0 / 20.0;

/// Масштаб подписей угла
pub const ANGLE_LABEL_SCALE: f32 = 1.0 / 20.0;

/// Радиус дуги угла
pub const ANGLE_ARC_RADIUS: f32 = 0.6;

/// Количество сегментов дуги угла
pub const ANGLE_ARC_SEGMENTS: usize = 16;

pub const LINE_COLOR: ColorHex = 0xffffff;

/// Цвет призрачной фигуры
pub const GHOST_COLOR: ColorHex = 0xff0000;

pub const DEFAULT_VOLUME_HEIGHT: f32 = 5.0;
pub const VOLUME_OPACITY: f32 = 0.5;
pub const AREA_OPACITY: f32 = 1.0;
pub const LINE_OPACITY: f32 = 1.0;
pub const LINE_WIDTH: f32 = 5.0;

/// Числитель скорости поворота: speed = ROTATION_SPEED_FACTOR / distance
pub const ROTATION_SPEED_FACTOR: f32 = 20.0;

/// Смещение подписи: distance / LABEL_OFFSET_DIVISOR + LABEL_OFFSET_BASE
pub const LABEL_OFFSET_BASE: f32 = 0.8;
pub const LABEL_OFFSET_DIVISOR: f32 = 100.0;

/// Смещение подписи при создании (до первого кадра)
pub const LABEL_INITIAL_OFFSET: f32 = 1.0;

/// Знаков после запятой в подписях
pub const LABEL_PRECISION: usize = 2;
