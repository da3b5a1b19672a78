use crate::model::{EllipsePrimitive, RectPrimitive};

/// Addresses one editable value of a logged command. The numeric values
/// are stable and may be used by hosts that only pass integers around.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[repr(u16)]
pub enum CommandKey {
    Cp1X = 0,
    Cp1Y = 1,
    Cp2X = 2,
    Cp2Y = 3,
    X = 4,
    Y = 5,
    Width = 6,
    Height = 7,
    Cx = 100,
    Cy = 101,
    Rx = 102,
    Ry = 103,
}

impl CommandKey {
    pub fn from_raw(raw: u16) -> Option<Self> {
        use CommandKey::*;
        Some(match raw {
            0 => Cp1X,
            1 => Cp1Y,
            2 => Cp2X,
            3 => Cp2Y,
            4 => X,
            5 => Y,
            6 => Width,
            7 => Height,
            100 => Cx,
            101 => Cy,
            102 => Rx,
            103 => Ry,
            _ => return None,
        })
    }

    pub fn raw(self) -> u16 { self as u16 }

    /// Which point of a move, line or curve command the key addresses and
    /// which coordinate of it.
    pub(crate) fn control_point(self) -> Option<(usize, usize)> {
        match self {
            CommandKey::Cp1X => Some((1, 0)),
            CommandKey::Cp1Y => Some((1, 1)),
            CommandKey::Cp2X => Some((2, 0)),
            CommandKey::Cp2Y => Some((2, 1)),
            CommandKey::X => Some((3, 0)),
            CommandKey::Y => Some((3, 1)),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum CommandKind {
    MoveTo,
    LineTo,
    CurveTo,
    Rect(RectPrimitive),
    Ellipse(EllipsePrimitive),
}

/// A logged drawing operation. For move, line and curve commands `index` is
/// the point the command starts at (the current point for lines and curves)
/// and its `k`th point lives at `index + direction * k`. For rect and ellipse
/// commands `index` is the lowest buffer position of the `len` points they
/// wrote, and a negative `direction` means the window is stored reversed.
#[derive(Clone, PartialEq, Debug)]
pub struct Command {
    pub(crate) kind: CommandKind,
    pub(crate) index: usize,
    pub(crate) direction: isize,
    pub(crate) len: usize,
    pub(crate) dirty: bool,
}

impl Command {
    pub(crate) fn new(kind: CommandKind, index: usize, len: usize) -> Self {
        Self { kind, index, direction: 1, len, dirty: false }
    }

    pub fn kind(&self) -> &CommandKind { &self.kind }

    pub fn index(&self) -> usize { self.index }

    pub fn direction(&self) -> isize { self.direction }

    pub fn is_dirty(&self) -> bool { self.dirty }

    pub(crate) fn point(&self, k: usize) -> usize {
        (self.index as isize + self.direction * k as isize) as usize
    }

    /// Lowest buffer position the command touches.
    pub(crate) fn first_point(&self) -> usize {
        if self.direction < 0 && !self.is_primitive() {
            self.index.saturating_sub(self.len.saturating_sub(1))
        } else {
            self.index
        }
    }

    pub(crate) fn is_primitive(&self) -> bool {
        matches!(self.kind, CommandKind::Rect(_) | CommandKind::Ellipse(_))
    }

    /// Point and coordinate addressed by `key`, if the command has it.
    pub(crate) fn key_target(&self, key: CommandKey) -> Option<(usize, usize)> {
        match self.kind {
            CommandKind::MoveTo => match key {
                CommandKey::X => Some((self.point(0), 0)),
                CommandKey::Y => Some((self.point(0), 1)),
                _ => None,
            },
            CommandKind::LineTo => match key {
                CommandKey::X | CommandKey::Y => {
                    key.control_point().map(|(k, coord)| (self.point(k), coord))
                }
                _ => None,
            },
            CommandKind::CurveTo => key.control_point().map(|(k, coord)| (self.point(k), coord)),
            _ => None,
        }
    }
}
