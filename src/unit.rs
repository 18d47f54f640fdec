//! Vector unit lifecycle.
//!
//! A [`VectorUnit`] owns one [`ExecutionContext`] and the backend chosen for
//! it. The backend is picked once in [`VectorUnit::init`] and never changes;
//! every instruction then runs through the same monomorphised code path.

use crate::config::{BackendPreference, Config};
use crate::execute::{LoadOp, MemoryUnit, StoreOp, VectorAlu, VectorOp};
use crate::state::{ExecutionContext, VcePacking};
use crate::traits::{BusError, InitError, MemoryBus};
use crate::vector::{verify_against_generic, Backend, GenericVector};
#[cfg(target_arch = "x86_64")]
use crate::vector::SseVector;

/// One vector unit: state plus backend.
#[derive(Debug, Clone)]
pub struct VectorUnit {
    backend: Backend,
    ctx: ExecutionContext,
}

impl VectorUnit {
    /// Create a vector unit from configuration.
    pub fn init(config: &Config) -> Result<Self, InitError> {
        let backend = match config.backend() {
            BackendPreference::Auto => Backend::detect(),
            BackendPreference::Generic => Backend::Generic,
            BackendPreference::Accelerated => {
                let backend = Backend::detect();
                if !backend.is_accelerated() {
                    return Err(InitError::BackendUnavailable(Backend::Sse2.name()));
                }
                backend
            }
        };

        let unit = Self::with_backend(backend, config.vce_packing(), config.validate_backend())?;
        log::info!("Vector unit using {} backend", unit.backend);
        Ok(unit)
    }

    /// Create a vector unit on a specific backend.
    ///
    /// With `validate` set, an accelerated backend is checked against the
    /// portable one before it is accepted.
    pub fn with_backend(
        backend: Backend,
        vce_packing: VcePacking,
        validate: bool,
    ) -> Result<Self, InitError> {
        if !backend.is_available() {
            return Err(InitError::BackendUnavailable(backend.name()));
        }

        if validate && backend.is_accelerated() {
            if let Some(case) = Self::self_test(backend) {
                log::warn!("{} backend failed self-test on {}", backend, case);
                return Err(InitError::BackendMismatch { backend, case });
            }
            log::debug!("{} backend passed self-test", backend);
        }

        Ok(Self {
            backend,
            ctx: ExecutionContext::with_vce_packing(vce_packing),
        })
    }

    /// Release the unit.
    pub fn destroy(self) {
        log::debug!(
            "Vector unit ({}) destroyed after {} instructions",
            self.backend,
            self.ctx.instructions
        );
    }

    fn self_test(backend: Backend) -> Option<String> {
        match backend {
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => verify_against_generic::<SseVector>(),
            _ => verify_against_generic::<GenericVector>(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.ctx
    }

    /// Reset architectural state, keeping the backend.
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    /// Execute one computational instruction.
    pub fn execute(&mut self, op: &VectorOp) {
        match self.backend {
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => VectorAlu::execute::<SseVector>(op, &mut self.ctx),
            _ => VectorAlu::execute::<GenericVector>(op, &mut self.ctx),
        }
    }

    /// Decode and execute an instruction word.
    ///
    /// Returns `false` if the word is not a computational vector instruction.
    pub fn execute_word(&mut self, word: u32) -> bool {
        match VectorOp::decode(word) {
            Some(op) => {
                self.execute(&op);
                true
            }
            None => {
                log::debug!("Not a vector instruction: 0x{:08X}", word);
                false
            }
        }
    }

    /// Vector load into `vt`.
    pub fn load<B: MemoryBus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: LoadOp,
        address: u32,
        element: u8,
        vt: u8,
    ) -> Result<(), BusError> {
        MemoryUnit::load(&mut self.ctx, bus, op, address, element, vt)
    }

    /// Vector store from `vt`.
    pub fn store<B: MemoryBus + ?Sized>(
        &mut self,
        bus: &mut B,
        op: StoreOp,
        address: u32,
        element: u8,
        vt: u8,
    ) -> Result<(), BusError> {
        MemoryUnit::store(&self.ctx, bus, op, address, element, vt)
    }
}
