//! NetCDF array files read through the native netcdf library.
//!
//! The netcdf library wraps libnetcdf/HDF5, which hold global state and are
//! not safe to call concurrently on one handle. Each file keeps its handle
//! behind a mutex; reads on different files proceed in parallel.

use std::path::Path;
use std::sync::Arc;
use std::sync::Once;

use netcdf::types::{FloatType, IntType, NcVariableType};
use parking_lot::Mutex;
use product_common::{Array, AttributeValue, DataType, MetadataAttribute};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::file::{ArrayFile, ArrayFileOpener, Dimension, VariableInfo};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics even for errors the Rust
/// side handles, such as probing for optional attributes. Safe to call more
/// than once; only the first call has an effect.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with null handlers disables printing, which is
        // a documented use; HDF5 serializes the call internally.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Opens `.nc` files with the netcdf library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetcdfOpener;

impl ArrayFileOpener for NetcdfOpener {
    fn open(&self, path: &Path) -> StoreResult<Arc<dyn ArrayFile>> {
        Ok(Arc::new(NetcdfArrayFile::open(path)?))
    }
}

/// An open NetCDF file.
pub struct NetcdfArrayFile {
    location: String,
    file: Mutex<Option<netcdf::File>>,
}

impl NetcdfArrayFile {
    pub fn open(path: &Path) -> StoreResult<Self> {
        silence_hdf5_errors();

        let location = path.display().to_string();
        let file = netcdf::open(path).map_err(|e| {
            StoreError::InvalidFormat(format!("failed to open NetCDF {}: {}", location, e))
        })?;
        debug!(location = %location, "Opened NetCDF file");

        Ok(Self {
            location,
            file: Mutex::new(Some(file)),
        })
    }
}

fn data_type_of(var: &netcdf::Variable) -> Option<DataType> {
    match var.vartype() {
        NcVariableType::Int(IntType::I8) => Some(DataType::Int8),
        NcVariableType::Int(IntType::U8) => Some(DataType::UInt8),
        NcVariableType::Int(IntType::I16) => Some(DataType::Int16),
        NcVariableType::Int(IntType::U16) => Some(DataType::UInt16),
        NcVariableType::Int(IntType::I32) => Some(DataType::Int32),
        NcVariableType::Int(IntType::U32) => Some(DataType::UInt32),
        NcVariableType::Int(IntType::I64) => Some(DataType::Int64),
        NcVariableType::Int(IntType::U64) => Some(DataType::UInt64),
        NcVariableType::Float(FloatType::F32) => Some(DataType::Float32),
        NcVariableType::Float(FloatType::F64) => Some(DataType::Float64),
        _ => None,
    }
}

fn convert_attribute(value: netcdf::AttributeValue) -> Option<AttributeValue> {
    use netcdf::AttributeValue as Nc;

    let numbers = |values: Vec<f64>| Some(AttributeValue::Numbers(values));
    match value {
        Nc::Str(text) => Some(AttributeValue::Text(text)),
        Nc::Strs(texts) => Some(AttributeValue::Text(texts.join(" "))),
        Nc::Uchar(v) => numbers(vec![v as f64]),
        Nc::Uchars(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Schar(v) => numbers(vec![v as f64]),
        Nc::Schars(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Ushort(v) => numbers(vec![v as f64]),
        Nc::Ushorts(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Short(v) => numbers(vec![v as f64]),
        Nc::Shorts(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Uint(v) => numbers(vec![v as f64]),
        Nc::Uints(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Int(v) => numbers(vec![v as f64]),
        Nc::Ints(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Ulonglong(v) => numbers(vec![v as f64]),
        Nc::Ulonglongs(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Longlong(v) => numbers(vec![v as f64]),
        Nc::Longlongs(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Float(v) => numbers(vec![v as f64]),
        Nc::Floats(v) => numbers(v.into_iter().map(|x| x as f64).collect()),
        Nc::Double(v) => numbers(vec![v]),
        Nc::Doubles(v) => numbers(v),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn variable_info(var: &netcdf::Variable) -> Option<VariableInfo> {
    let data_type = data_type_of(var)?;
    let dimensions = var
        .dimensions()
        .iter()
        .map(|d| Dimension::new(d.name(), d.len()))
        .collect();

    let mut attributes = Vec::new();
    for attr in var.attributes() {
        match attr.value() {
            Ok(value) => {
                if let Some(value) = convert_attribute(value) {
                    attributes.push(MetadataAttribute {
                        name: attr.name().to_string(),
                        value,
                    });
                }
            }
            Err(e) => warn!(
                variable = %var.name(),
                attribute = %attr.name(),
                error = %e,
                "Skipping unreadable attribute"
            ),
        }
    }

    Some(VariableInfo {
        name: var.name(),
        data_type,
        dimensions,
        attributes,
    })
}

fn read_values(
    var: &netcdf::Variable,
    data_type: DataType,
    shape: Vec<usize>,
    location: &str,
) -> StoreResult<Array> {
    let failed = |e: netcdf::Error| {
        StoreError::InvalidFormat(format!("failed to read '{}' from {}: {}", var.name(), location, e))
    };
    let array = match data_type {
        DataType::Int8 => Array::new(shape, var.get_values::<i8, _>(..).map_err(failed)?),
        DataType::UInt8 => Array::new(shape, var.get_values::<u8, _>(..).map_err(failed)?),
        DataType::Int16 => Array::new(shape, var.get_values::<i16, _>(..).map_err(failed)?),
        DataType::UInt16 => Array::new(shape, var.get_values::<u16, _>(..).map_err(failed)?),
        DataType::Int32 => Array::new(shape, var.get_values::<i32, _>(..).map_err(failed)?),
        DataType::UInt32 => Array::new(shape, var.get_values::<u32, _>(..).map_err(failed)?),
        DataType::Int64 => Array::new(shape, var.get_values::<i64, _>(..).map_err(failed)?),
        DataType::UInt64 => Array::new(shape, var.get_values::<u64, _>(..).map_err(failed)?),
        DataType::Float32 => Array::new(shape, var.get_values::<f32, _>(..).map_err(failed)?),
        DataType::Float64 => Array::new(shape, var.get_values::<f64, _>(..).map_err(failed)?),
    };
    array.map_err(|e| StoreError::InvalidFormat(e.to_string()))
}

impl ArrayFile for NetcdfArrayFile {
    fn location(&self) -> &str {
        &self.location
    }

    fn variable_names(&self) -> Vec<String> {
        self.file
            .lock()
            .as_ref()
            .map(|f| f.variables().map(|v| v.name()).collect())
            .unwrap_or_default()
    }

    fn variable(&self, name: &str) -> Option<VariableInfo> {
        let guard = self.file.lock();
        let file = guard.as_ref()?;
        let var = file.variable(name)?;
        variable_info(&var)
    }

    fn read(&self, name: &str) -> StoreResult<Array> {
        let guard = self.file.lock();
        let file = guard
            .as_ref()
            .ok_or_else(|| StoreError::Closed(self.location.clone()))?;
        let var = file
            .variable(name)
            .ok_or_else(|| StoreError::variable_not_found(name, &self.location))?;
        let data_type = data_type_of(&var).ok_or_else(|| {
            StoreError::InvalidFormat(format!("unsupported type of variable '{}'", name))
        })?;
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

        read_values(&var, data_type, shape, &self.location)
    }

    fn close(&self) -> StoreResult<()> {
        if self.file.lock().take().is_some() {
            debug!(location = %self.location, "Closed NetCDF file");
        }
        Ok(())
    }
}
