//! Variable registry
//!
//! A read-only table, supplied by the host at startup, mapping each VP
//! address to its [`VpVariable`] descriptor. Lookups are total: an address
//! resolves to exactly one descriptor or to nothing.

mod bridge;
mod variable;

pub use bridge::{Control, Mirror};
pub use variable::{DisplayInput, DisplayOutput, VpData, VpVariable, MAX_VP_SIZE};

/// Errors detected while building a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Two descriptors share this address
    DuplicateAddress(u16),
    /// Descriptor declares more than [`MAX_VP_SIZE`] bytes
    VariableTooLarge(u16),
}

/// Lookup table over a host-supplied descriptor slice
#[derive(Debug, Clone, Copy)]
pub struct VpRegistry<'a> {
    vars: &'a [VpVariable],
    /// Table is in ascending address order, enabling binary search
    sorted: bool,
}

impl<'a> VpRegistry<'a> {
    /// Validate `vars` and build a registry over it
    ///
    /// Tables sorted by address are searched by bisection; any other order
    /// falls back to a linear scan.
    pub fn new(vars: &'a [VpVariable]) -> Result<Self, RegistryError> {
        if let Some(var) = vars.iter().find(|v| v.size as usize > MAX_VP_SIZE) {
            return Err(RegistryError::VariableTooLarge(var.vp));
        }

        let sorted = vars.windows(2).all(|pair| pair[0].vp < pair[1].vp);
        if !sorted {
            // Strictly ascending already rules out duplicates
            for (i, var) in vars.iter().enumerate() {
                if vars[i + 1..].iter().any(|other| other.vp == var.vp) {
                    return Err(RegistryError::DuplicateAddress(var.vp));
                }
            }
        }

        Ok(Self { vars, sorted })
    }

    /// Find the descriptor for `vp`
    pub fn find(&self, vp: u16) -> Option<&'a VpVariable> {
        if self.sorted {
            self.vars
                .binary_search_by_key(&vp, |var| var.vp)
                .ok()
                .map(|index| &self.vars[index])
        } else {
            self.vars.iter().find(|var| var.vp == vp)
        }
    }

    /// Copy the descriptor for `vp` into `out`
    ///
    /// Returns false, leaving `out` untouched, if `vp` is not registered.
    pub fn populate(&self, vp: u16, out: &mut VpVariable) -> bool {
        match self.find(vp) {
            Some(var) => {
                *out = *var;
                true
            }
            None => false,
        }
    }

    /// Number of registered VPs
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if no VPs are registered
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over all descriptors in table order
    pub fn iter(&self) -> impl Iterator<Item = &'a VpVariable> {
        self.vars.iter()
    }
}
