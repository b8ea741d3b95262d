//! The machine: owner of every component.
//!
//! `Machine` is the single owner of the cross-CPU state (physical memory,
//! bus, coordinator); each CPU core borrows the shared pieces through `Arc`
//! handles. Execution is driven two ways:
//! 1. **Single-stepped:** `step_cpu` advances one CPU by one instruction,
//!    the mode tests and scripted drivers use.
//! 2. **Threaded:** `run` spawns one host thread per CPU; threads advance
//!    independently with no global instruction clock, honoring pause and
//!    halt at instruction boundaries.

use std::sync::Arc;
use std::time::Duration;

use crate::common::error::ConfigError;
use crate::config::Config;
use crate::cpu::step::StepOutcome;
use crate::cpu::{CoreState, CpuCore};
use crate::mem::system::MemorySystem;
use crate::smp::SmpCoordinator;
use crate::soc::bus::Bus;
use crate::soc::devices::Device;
use crate::soc::phys::PhysicalMemory;

/// Observable machine events delivered to an installed sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineEvent {
    /// A CPU retired one instruction.
    InstructionRetired {
        /// CPU ordinal.
        cpu: usize,
        /// PC of the retired instruction.
        pc: u64,
    },
    /// A CPU changed run state.
    StateChanged {
        /// CPU ordinal.
        cpu: usize,
        /// The new state.
        state: CoreState,
    },
}

type Observer = Box<dyn Fn(&MachineEvent) + Send + Sync>;

/// Builder mapping devices before the bus is frozen.
///
/// Bus mutations require exclusive access; they are only possible here,
/// before any CPU exists.
pub struct MachineBuilder {
    config: Config,
    bus: Bus,
}

impl MachineBuilder {
    /// Starts building a machine from a configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            bus: Bus::new(),
        }
    }

    /// Maps a device at `[base, base + size)`; refuses overlap.
    pub fn with_device(
        mut self,
        device: Box<dyn Device>,
        base: u64,
        size: u64,
    ) -> Result<Self, ConfigError> {
        self.bus.map(device, base, size)?;
        Ok(self)
    }

    /// Finishes construction: allocates memory, the coordinator, and CPUs.
    pub fn build(self) -> Machine {
        let config = self.config;
        let phys = Arc::new(PhysicalMemory::new(config.memory.ram_size));
        let bus = Arc::new(self.bus);
        let coord = Arc::new(SmpCoordinator::new(
            config.general.num_cpus.max(1),
            Duration::from_millis(config.smp.barrier_timeout_ms),
        ));

        let cpus = (0..config.general.num_cpus.max(1))
            .map(|cpu_id| {
                let mem = MemorySystem::new(
                    cpu_id,
                    &config,
                    Arc::clone(&phys),
                    Arc::clone(&bus),
                    Arc::clone(&coord),
                );
                CpuCore::new(cpu_id, &config, mem, Arc::clone(&coord))
            })
            .collect();

        Machine {
            config,
            phys,
            bus,
            coord,
            cpus,
            observer: None,
        }
    }
}

/// The assembled machine.
pub struct Machine {
    /// The configuration the machine was built from.
    pub config: Config,
    phys: Arc<PhysicalMemory>,
    bus: Arc<Bus>,
    coord: Arc<SmpCoordinator>,
    cpus: Vec<CpuCore>,
    observer: Option<Observer>,
}

impl Machine {
    /// Builds a machine with no devices mapped.
    pub fn new(config: Config) -> Self {
        MachineBuilder::new(config).build()
    }

    /// Starts building a machine with devices.
    pub fn builder(config: Config) -> MachineBuilder {
        MachineBuilder::new(config)
    }

    /// Returns the number of CPUs.
    pub fn num_cpus(&self) -> usize {
        self.cpus.len()
    }

    /// Returns a CPU by ordinal.
    pub fn cpu(&self, idx: usize) -> &CpuCore {
        &self.cpus[idx]
    }

    /// Returns a CPU mutably by ordinal.
    pub fn cpu_mut(&mut self, idx: usize) -> &mut CpuCore {
        &mut self.cpus[idx]
    }

    /// Returns the shared physical memory.
    pub fn phys(&self) -> &Arc<PhysicalMemory> {
        &self.phys
    }

    /// Returns the shared bus.
    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    /// Returns the SMP coordinator.
    pub fn coordinator(&self) -> &Arc<SmpCoordinator> {
        &self.coord
    }

    /// Installs the observability sink.
    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    fn emit(&self, event: MachineEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Moves every CPU out of `Reset`/`Paused` into `Running`.
    pub fn start_all(&mut self) {
        for idx in 0..self.cpus.len() {
            if self.cpus[idx].start() {
                let event = MachineEvent::StateChanged {
                    cpu: idx,
                    state: self.cpus[idx].state,
                };
                self.emit(event);
            }
        }
    }

    /// Requests a cooperative pause of every CPU.
    pub fn pause_all(&self) {
        for cpu in &self.cpus {
            cpu.request_pause();
        }
    }

    /// Resets every CPU and device; memory contents are preserved.
    pub fn reset(&mut self) {
        for cpu in &mut self.cpus {
            cpu.reset();
        }
        self.bus.reset();
    }

    /// Single-steps one CPU, reporting through the observer.
    pub fn step_cpu(&mut self, idx: usize) -> StepOutcome {
        let pc = self.cpus[idx].pc();
        let before = self.cpus[idx].state;
        let outcome = self.cpus[idx].step();
        let after = self.cpus[idx].state;

        if outcome == StepOutcome::Retired {
            self.emit(MachineEvent::InstructionRetired { cpu: idx, pc });
        }
        if before != after {
            self.emit(MachineEvent::StateChanged {
                cpu: idx,
                state: after,
            });
        }
        outcome
    }

    /// Runs every CPU on its own host thread until all have halted or
    /// retired `limit` instructions.
    ///
    /// Threads advance independently; pause requests and resumption are
    /// honored at instruction boundaries. Returns per-CPU retired counts.
    pub fn run(&mut self, limit: u64) -> Vec<u64> {
        let cpus = &mut self.cpus;
        let results: Vec<u64> = std::thread::scope(|scope| {
            let mut workers = Vec::new();
            for cpu in cpus.iter_mut() {
                workers.push(scope.spawn(move || run_cpu(cpu, limit)));
            }
            workers.into_iter().map(|w| w.join().unwrap_or(0)).collect()
        });

        for idx in 0..self.cpus.len() {
            self.emit(MachineEvent::StateChanged {
                cpu: idx,
                state: self.cpus[idx].state,
            });
        }
        results
    }
}

/// Drives one CPU until it halts or retires `limit` instructions.
fn run_cpu(cpu: &mut CpuCore, limit: u64) -> u64 {
    let _ = cpu.start();
    let mut retired = 0u64;
    loop {
        match cpu.step() {
            StepOutcome::Retired => {
                retired += 1;
                if retired >= limit {
                    return retired;
                }
            }
            StepOutcome::Exception | StepOutcome::Interrupted => {}
            StepOutcome::Halted => return retired,
            StepOutcome::Idle => {
                if cpu.state == CoreState::Paused {
                    if cpu.pause_pending() {
                        // Stay paused; poll for resumption.
                        std::thread::sleep(std::time::Duration::from_micros(100));
                    } else {
                        let _ = cpu.start();
                    }
                } else {
                    // Reset without start; nothing to do.
                    return retired;
                }
            }
        }
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("num_cpus", &self.cpus.len())
            .field("ram_size", &self.phys.len())
            .finish_non_exhaustive()
    }
}
