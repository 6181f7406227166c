//! Tensor descriptor, borrowed view, and named tensor mapping

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{quant, TensorError};

/// Fixed-width element type of a quantized tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Int8,
    Int16,
}

impl ElementType {
    /// Size of one element in bytes
    pub fn size_bytes(&self) -> usize {
        match self {
            ElementType::Int8 => 1,
            ElementType::Int16 => 2,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
        }
    }
}

/// Placement hint for tensor storage.
///
/// Only consulted by the allocator when data is copied; borrowed
/// buffers stay wherever they already live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryRegion {
    /// Fast on-chip RAM
    #[default]
    Internal,
    /// External PSRAM
    External,
}

impl MemoryRegion {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryRegion::Internal => "internal",
            MemoryRegion::External => "external",
        }
    }
}

/// Ordered tensor dimensions (batch, channel, height, width for images)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a shape, rejecting empty or zero-sized dimensions
    pub fn new(dims: impl Into<Vec<usize>>) -> Result<Self, TensorError> {
        let dims = dims.into();
        if dims.is_empty() {
            return Err(TensorError::EmptyShape);
        }
        if dims.contains(&0) {
            return Err(TensorError::ZeroDimension(format!("{:?}", dims)));
        }
        Ok(Self(dims))
    }

    /// Dimension sizes
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Product of all dimensions
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Element storage, borrowed (no-copy) or owned (copy)
#[derive(Debug, Clone)]
pub enum TensorData<'a> {
    Int8(Cow<'a, [i8]>),
    Int16(Cow<'a, [i16]>),
}

impl TensorData<'_> {
    /// Number of stored elements
    pub fn len(&self) -> usize {
        match self {
            TensorData::Int8(d) => d.len(),
            TensorData::Int16(d) => d.len(),
        }
    }

    /// Check if there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type of the storage
    pub fn element_type(&self) -> ElementType {
        match self {
            TensorData::Int8(_) => ElementType::Int8,
            TensorData::Int16(_) => ElementType::Int16,
        }
    }

    /// Whether the data references a caller-owned buffer
    pub fn is_borrowed(&self) -> bool {
        match self {
            TensorData::Int8(d) => matches!(d, Cow::Borrowed(_)),
            TensorData::Int16(d) => matches!(d, Cow::Borrowed(_)),
        }
    }

    fn dequantize(&self, exponent: i32) -> Vec<f32> {
        match self {
            TensorData::Int8(d) => quant::dequantize(&d[..], exponent),
            TensorData::Int16(d) => quant::dequantize(&d[..], exponent),
        }
    }
}

/// Quantized tensor descriptor
#[derive(Debug, Clone)]
pub struct TensorDescriptor<'a> {
    shape: Shape,
    data: TensorData<'a>,
    exponent: i32,
    region: MemoryRegion,
}

impl<'a> TensorDescriptor<'a> {
    /// Wrap an existing int8 buffer without copying it
    pub fn borrowed(
        shape: Shape,
        data: &'a [i8],
        exponent: i32,
        region: MemoryRegion,
    ) -> Result<Self, TensorError> {
        Self::from_data(shape, TensorData::Int8(Cow::Borrowed(data)), exponent, region)
    }

    /// Wrap an existing int16 buffer without copying it
    pub fn borrowed_i16(
        shape: Shape,
        data: &'a [i16],
        exponent: i32,
        region: MemoryRegion,
    ) -> Result<Self, TensorError> {
        Self::from_data(shape, TensorData::Int16(Cow::Borrowed(data)), exponent, region)
    }

    /// Build a descriptor from any storage, checking it against the shape
    pub fn from_data(
        shape: Shape,
        data: TensorData<'a>,
        exponent: i32,
        region: MemoryRegion,
    ) -> Result<Self, TensorError> {
        let expected = shape.element_count();
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                shape: shape.to_string(),
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            shape,
            data,
            exponent,
            region,
        })
    }

    /// Shape of the tensor
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Element type
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Shared quantization exponent
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Memory placement hint
    pub fn region(&self) -> MemoryRegion {
        self.region
    }

    /// Number of elements
    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// Raw element storage
    pub fn data(&self) -> &TensorData<'a> {
        &self.data
    }

    /// Non-owning view for handing the tensor to readers
    pub fn view(&self) -> TensorView<'_> {
        TensorView { inner: self }
    }
}

impl TensorDescriptor<'static> {
    /// Copy an int8 buffer into storage owned by the descriptor
    pub fn copied(
        shape: Shape,
        data: &[i8],
        exponent: i32,
        region: MemoryRegion,
    ) -> Result<Self, TensorError> {
        let mut owned: Vec<i8> = Vec::new();
        owned
            .try_reserve_exact(data.len())
            .map_err(|_| TensorError::Allocation {
                bytes: data.len() * ElementType::Int8.size_bytes(),
            })?;
        owned.extend_from_slice(data);
        Self::owned(shape, owned, exponent, region)
    }

    /// Take ownership of an already-allocated int8 buffer
    pub fn owned(
        shape: Shape,
        data: Vec<i8>,
        exponent: i32,
        region: MemoryRegion,
    ) -> Result<Self, TensorError> {
        Self::from_data(shape, TensorData::Int8(Cow::Owned(data)), exponent, region)
    }
}

/// Read-only view of a tensor owned by someone else.
///
/// A view cannot outlive or release the descriptor it was taken from.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    inner: &'a TensorDescriptor<'a>,
}

impl<'a> TensorView<'a> {
    pub fn shape(&self) -> &'a Shape {
        &self.inner.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.inner.element_type()
    }

    pub fn exponent(&self) -> i32 {
        self.inner.exponent
    }

    pub fn region(&self) -> MemoryRegion {
        self.inner.region
    }

    pub fn element_count(&self) -> usize {
        self.inner.element_count()
    }

    pub fn data(&self) -> &'a TensorData<'a> {
        &self.inner.data
    }

    /// Int8 elements, if that is the storage type
    pub fn as_i8(&self) -> Option<&'a [i8]> {
        let inner: &'a TensorDescriptor<'a> = self.inner;
        match &inner.data {
            TensorData::Int8(d) => Some(&d[..]),
            TensorData::Int16(_) => None,
        }
    }

    /// Real values: `stored * 2^exponent`
    pub fn dequantize(&self) -> Vec<f32> {
        self.inner.data.dequantize(self.inner.exponent)
    }
}

/// Named tensors passed to or read back from a model
pub type TensorMap<'a> = BTreeMap<String, TensorView<'a>>;
