use crate::{curves::TEXEL_ROW_LEN, error::Result, CurveRecord, VgError};
use derivative::Derivative;
use half::f16;

/// One row of half floats per curve id, in the layout of
/// [`CurveRecord::texel_row`].
#[derive(Derivative, Clone, Default)]
#[derivative(Debug)]
pub struct CurvesTexture {
    #[derivative(Debug(format_with = "crate::util::format_helpers::print_points_len"))]
    data: Vec<f16>,
}

impl CurvesTexture {
    pub fn new() -> Self { Self::default() }

    pub fn from_records(records: &[CurveRecord]) -> Result<Self> {
        let mut texture = Self::new();
        texture.reserve(records.len())?;
        for record in records {
            texture.push(record);
        }
        Ok(texture)
    }

    pub fn reserve(&mut self, rows: usize) -> Result<()> {
        self.data.try_reserve(rows * TEXEL_ROW_LEN).map_err(|_| VgError::OutOfMemory("curves texture"))
    }

    pub fn push(&mut self, record: &CurveRecord) {
        self.data.extend(record.texel_row().iter().map(|&value| f16::from_f32(value)));
    }

    pub fn rows(&self) -> usize { self.data.len() / TEXEL_ROW_LEN }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    pub fn row(&self, curve: usize) -> &[f16] { &self.data[curve * TEXEL_ROW_LEN..(curve + 1) * TEXEL_ROW_LEN] }

    pub fn as_slice(&self) -> &[f16] { &self.data }

    pub fn as_bytes(&self) -> &[u8] { bytemuck::cast_slice(&self.data) }
}
