/*!
 * Program Registry
 * Append-only map from program IDs to entry points, with autostart bits
 */

use super::idle::idle_program;
use crate::core::errors::ProgramError;
use crate::core::limits::{IDLE_PROGRAM, MAX_NUMBER_OF_PROGRAMS};
use crate::core::types::ProgramId;
use log::debug;

/// Program entry point; on the target it never returns
pub type Program = fn();

/// Program registry result
pub type ProgramResult<T> = Result<T, ProgramError>;

/// Entry point identity is its code address
#[inline(always)]
pub fn same_program(a: Program, b: Program) -> bool {
    a as usize == b as usize
}

/// Fixed-size program registry
#[derive(Debug, Clone)]
pub struct ProgramRegistry {
    programs: [Option<Program>; MAX_NUMBER_OF_PROGRAMS],
    autostart: u16,
}

impl ProgramRegistry {
    /// Empty registry without the idle program
    pub const fn new() -> Self {
        Self {
            programs: [None; MAX_NUMBER_OF_PROGRAMS],
            autostart: 0,
        }
    }

    /// Registry with the idle program in slot 0, marked autostart
    pub fn with_idle() -> Self {
        let mut registry = Self::new();
        registry.programs[IDLE_PROGRAM as usize] = Some(idle_program);
        registry.autostart |= 1 << IDLE_PROGRAM;
        registry
    }

    /// Register an entry point
    ///
    /// Returns the existing ID when the entry point is already registered,
    /// otherwise the first free slot.
    pub fn register(&mut self, program: Program) -> ProgramResult<ProgramId> {
        if let Some(id) = self.lookup_id(program) {
            return Ok(id);
        }

        let slot = self
            .programs
            .iter()
            .position(Option::is_none)
            .ok_or(ProgramError::RegistryFull {
                capacity: MAX_NUMBER_OF_PROGRAMS,
            })?;

        self.programs[slot] = Some(program);
        debug!("Program registered in slot {}", slot);
        Ok(slot as ProgramId)
    }

    /// Entry point of a program, `None` when unregistered or out of range
    #[inline]
    pub fn lookup_function(&self, id: ProgramId) -> Option<Program> {
        self.programs.get(id as usize).copied().flatten()
    }

    /// ID of a registered entry point
    pub fn lookup_id(&self, program: Program) -> Option<ProgramId> {
        self.programs
            .iter()
            .position(|slot| slot.is_some_and(|p| same_program(p, program)))
            .map(|slot| slot as ProgramId)
    }

    /// Whether the program is launched by `init_scheduler`
    #[inline]
    pub fn check_autostart(&self, id: ProgramId) -> bool {
        (id as usize) < MAX_NUMBER_OF_PROGRAMS && self.autostart & (1 << id) != 0
    }

    /// Set or clear the autostart bit of a registered program
    pub fn set_autostart(&mut self, id: ProgramId, enabled: bool) -> ProgramResult<()> {
        if self.lookup_function(id).is_none() {
            return Err(ProgramError::NotRegistered(id));
        }

        if enabled {
            self.autostart |= 1 << id;
        } else {
            self.autostart &= !(1 << id);
        }
        Ok(())
    }

    /// Autostart bit mask, bit N for program N
    #[inline]
    pub fn autostart_mask(&self) -> u16 {
        self.autostart
    }

    /// Registered programs; valid as a count only because nothing is ever removed
    pub fn registered_count(&self) -> usize {
        self.programs.iter().filter(|slot| slot.is_some()).count()
    }

    /// IDs of autostart programs in ascending order
    pub fn autostart_programs(&self) -> impl Iterator<Item = ProgramId> + '_ {
        (0..MAX_NUMBER_OF_PROGRAMS as ProgramId).filter(|&id| self.check_autostart(id))
    }
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::with_idle()
    }
}
