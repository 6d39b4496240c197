// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Canon Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied — PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrapper around the Rust Canon Kernel.
//!
//! Exposes `CanonKernel`, `KernelConfig`, `format_diagnostics` and the
//! `CanonLoadError` / `KernelNotReadyError` exceptions as the Python
//! module `quantara_canon_boot`.
//!
//! # FFI Safety
//!
//! - Request dicts are copied into owned Rust values before scoring.
//! - The GIL is released for the duration of `respond`.
//! - Missing or `None` request keys become empty strings / lists.
//! - All config validated before storage (`KernelConfig::validate()`).
//!
//! Usage from Python:
//! ```python
//! from quantara_canon_boot import CanonKernel
//!
//! kernel = CanonKernel()
//! kernel.load_canon()
//! judged = kernel.respond({"user": "hi", "history": [], "draft": "hello"})
//! judged["final_reply"], judged["diagnostics"]["sigma"]
//! ```

use std::path::PathBuf;

use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use canon_core::{CanonKernel, CanonSource};
use canon_types::{CanonError, Diagnostics, KernelConfig, KernelResponse, TurnContext, TurnRecord};

create_exception!(quantara_canon_boot, CanonLoadError, PyException);
create_exception!(quantara_canon_boot, KernelNotReadyError, PyException);

fn to_py_err(err: CanonError) -> PyErr {
    match err {
        CanonError::CanonLoad(_) => CanonLoadError::new_err(err.to_string()),
        CanonError::KernelNotReady => KernelNotReadyError::new_err(err.to_string()),
        CanonError::Config(_) => PyValueError::new_err(err.to_string()),
    }
}

// ─── Request / response conversion ──────────────────────────────────

fn text_field(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<String> {
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => value.extract::<String>(),
        _ => Ok(String::new()),
    }
}

fn turn_context(request: &Bound<'_, PyDict>) -> PyResult<TurnContext> {
    let history = match request.get_item("history")? {
        Some(value) if !value.is_none() => {
            let turns: Vec<Bound<'_, PyDict>> = value.extract()?;
            turns
                .iter()
                .map(|turn| {
                    Ok(TurnRecord::new(
                        text_field(turn, "user")?,
                        text_field(turn, "assistant_raw")?,
                        text_field(turn, "assistant_canon")?,
                    ))
                })
                .collect::<PyResult<Vec<_>>>()?
        }
        _ => Vec::new(),
    };
    Ok(TurnContext::new(
        text_field(request, "user")?,
        history,
        text_field(request, "draft")?,
    ))
}

fn diagnostics_dict<'py>(py: Python<'py>, diag: &Diagnostics) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("kappa", diag.kappa)?;
    dict.set_item("tau", diag.tau)?;
    dict.set_item("sigma", diag.sigma)?;
    dict.set_item("cycle_detected", diag.cycle_detected)?;
    dict.set_item("zero_return", diag.zero_return)?;
    Ok(dict)
}

fn response_dict<'py>(py: Python<'py>, resp: &KernelResponse) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("final_reply", &resp.final_reply)?;
    dict.set_item("diagnostics", diagnostics_dict(py, &resp.diagnostics)?)?;
    Ok(dict)
}

// ─── PyKernelConfig ─────────────────────────────────────────────────

/// Python-visible configuration for the Canon Kernel.
#[pyclass(name = "KernelConfig")]
#[derive(Clone)]
struct PyKernelConfig {
    inner: KernelConfig,
}

#[pymethods]
impl PyKernelConfig {
    #[new]
    #[pyo3(signature = (
        accept_threshold = 0.4,
        history_window = 3,
        w_user = 0.6,
        tau_scale = 1.0,
        cycle_window = 4,
        similarity_threshold = 0.85,
        max_consecutive_corrections = 2,
        fallback_message = None,
        cycle_break_message = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        accept_threshold: f64,
        history_window: usize,
        w_user: f64,
        tau_scale: f64,
        cycle_window: usize,
        similarity_threshold: f64,
        max_consecutive_corrections: usize,
        fallback_message: Option<String>,
        cycle_break_message: Option<String>,
    ) -> PyResult<Self> {
        let defaults = KernelConfig::default();
        let config = KernelConfig {
            accept_threshold,
            history_window,
            w_user,
            tau_scale,
            cycle_window,
            similarity_threshold,
            max_consecutive_corrections,
            fallback_message: fallback_message.unwrap_or(defaults.fallback_message),
            cycle_break_message: cycle_break_message.unwrap_or(defaults.cycle_break_message),
        };
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = KernelConfig::from_json(json).map_err(to_py_err)?;
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    #[getter]
    fn accept_threshold(&self) -> f64 {
        self.inner.accept_threshold
    }

    #[getter]
    fn cycle_window(&self) -> usize {
        self.inner.cycle_window
    }

    #[getter]
    fn fallback_message(&self) -> &str {
        &self.inner.fallback_message
    }

    fn __repr__(&self) -> String {
        format!(
            "KernelConfig(accept_threshold={}, history_window={}, cycle_window={})",
            self.inner.accept_threshold, self.inner.history_window, self.inner.cycle_window
        )
    }
}

// ─── PyCanonKernel ──────────────────────────────────────────────────

/// Canon-coherence correction kernel exposed to Python.
///
/// Drop-in for the chat loop: `CanonKernel()`, `load_canon()`,
/// `respond({"user", "history", "draft"})`.
#[pyclass(name = "CanonKernel")]
struct PyCanonKernel {
    inner: CanonKernel,
}

#[pymethods]
impl PyCanonKernel {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyKernelConfig>) -> PyResult<Self> {
        let inner = match config {
            Some(c) => CanonKernel::with_config(c.inner).map_err(to_py_err)?,
            None => CanonKernel::new(),
        };
        Ok(Self { inner })
    }

    /// Load a canon from a JSON file, or the bundled default when
    /// `source` is None. Raises `CanonLoadError` on failure; a
    /// previously loaded canon stays active.
    #[pyo3(signature = (source = None))]
    fn load_canon(&self, source: Option<PathBuf>) -> PyResult<()> {
        let source = source.map_or(CanonSource::Default, CanonSource::Path);
        self.inner.load_canon_from(&source).map_err(to_py_err)
    }

    /// Load a canon from an inline JSON document.
    fn load_canon_json(&self, json: String) -> PyResult<()> {
        self.inner
            .load_canon_from(&CanonSource::Json(json))
            .map_err(to_py_err)
    }

    /// Judge a draft reply.
    ///
    /// Args:
    ///     request: dict with `user` (str), `history` (list of dicts with
    ///              `user`, `assistant_raw`, `assistant_canon`), `draft` (str).
    ///
    /// Returns:
    ///     dict with `final_reply` and `diagnostics`
    ///     (`kappa`, `tau`, `sigma`, `cycle_detected`, `zero_return`).
    fn respond<'py>(
        &self,
        py: Python<'py>,
        request: &Bound<'py, PyDict>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let ctx = turn_context(request)?;
        let resp = py
            .allow_threads(|| self.inner.respond(&ctx))
            .map_err(to_py_err)?;
        response_dict(py, &resp)
    }

    #[getter]
    fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    /// Name, version and entry count of the loaded canon, or None.
    fn canon_info<'py>(&self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyDict>>> {
        let Some(canon) = self.inner.canon() else {
            return Ok(None);
        };
        let dict = PyDict::new(py);
        dict.set_item("name", canon.name())?;
        dict.set_item("version", canon.version())?;
        dict.set_item("entries", canon.len())?;
        Ok(Some(dict))
    }

    fn __repr__(&self) -> String {
        match self.inner.canon() {
            Some(canon) => format!("CanonKernel(canon='{}', entries={})", canon.name(), canon.len()),
            None => "CanonKernel(canon=None)".to_string(),
        }
    }
}

/// One-line summary of a diagnostics dict; missing keys default.
#[pyfunction]
fn format_diagnostics(diagnostics: &Bound<'_, PyDict>) -> PyResult<String> {
    fn number(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<f64> {
        match dict.get_item(key)? {
            Some(v) if !v.is_none() => v.extract(),
            _ => Ok(0.0),
        }
    }
    fn flag(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<bool> {
        match dict.get_item(key)? {
            Some(v) => v.is_truthy(),
            None => Ok(false),
        }
    }
    let diag = Diagnostics {
        kappa: number(diagnostics, "kappa")?,
        tau: number(diagnostics, "tau")?,
        sigma: number(diagnostics, "sigma")?,
        cycle_detected: flag(diagnostics, "cycle_detected")?,
        zero_return: flag(diagnostics, "zero_return")?,
    };
    Ok(diag.to_string())
}

// ─── Module Registration ────────────────────────────────────────────

/// Canon Kernel — coherence checking and correction of model drafts.
///
/// - `CanonKernel` — load a canon, then `respond` per turn
/// - `KernelConfig` — thresholds and fallback messages
/// - `format_diagnostics` — one-line diagnostics summary
/// - `CanonLoadError`, `KernelNotReadyError` — raised by the kernel
#[pymodule]
fn quantara_canon_boot(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add_class::<PyKernelConfig>()?;
    m.add_class::<PyCanonKernel>()?;
    m.add_function(wrap_pyfunction!(format_diagnostics, m)?)?;
    m.add("CanonLoadError", py.get_type::<CanonLoadError>())?;
    m.add("KernelNotReadyError", py.get_type::<KernelNotReadyError>())?;
    Ok(())
}
