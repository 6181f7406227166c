//! Free-memory statistics per memory region

use dl_tensor::MemoryRegion;

/// Source of free-memory readings, used for diagnostics only
pub trait MemoryStats {
    /// Free bytes in `region`, or `None` if the platform cannot tell
    fn free_bytes(&self, region: MemoryRegion) -> Option<usize>;
}

/// Memory statistics of the host system.
///
/// A host process sees a single memory pool, so every region reports
/// the same figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMemory;

impl MemoryStats for SystemMemory {
    #[cfg(target_os = "linux")]
    fn free_bytes(&self, _region: MemoryRegion) -> Option<usize> {
        // SAFETY: sysinfo only writes into the struct we hand it
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        let ret = unsafe { libc::sysinfo(&mut info) };
        if ret != 0 {
            return None;
        }
        let bytes = (info.freeram as u64).saturating_mul(info.mem_unit as u64);
        usize::try_from(bytes).ok()
    }

    #[cfg(not(target_os = "linux"))]
    fn free_bytes(&self, _region: MemoryRegion) -> Option<usize> {
        None
    }
}

/// Fixed readings, for tests and simulations
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMemory {
    pub internal: Option<usize>,
    pub external: Option<usize>,
}

impl FixedMemory {
    /// Report the same figure for both regions
    pub fn uniform(bytes: usize) -> Self {
        Self {
            internal: Some(bytes),
            external: Some(bytes),
        }
    }
}

impl MemoryStats for FixedMemory {
    fn free_bytes(&self, region: MemoryRegion) -> Option<usize> {
        match region {
            MemoryRegion::Internal => self.internal,
            MemoryRegion::External => self.external,
        }
    }
}
