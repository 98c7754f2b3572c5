/// Aurora3D Engine - Singleton manager for engine subsystems
///
/// Global storage for the subsystems shared across the frame loop: the
/// event bus (always present once initialized) and the scene manager.
/// Uses thread-safe static storage with RwLock for safe concurrent access.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::event::EventBus;
use crate::scene::SceneManager;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

struct EngineState {
    event_bus: RwLock<Option<Arc<EventBus>>>,
    scene_manager: RwLock<Option<Arc<Mutex<SceneManager>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            event_bus: RwLock::new(None),
            scene_manager: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use aurora_3d_engine::aurora3d::Engine;
///
/// Engine::initialize()?;
/// Engine::create_scene_manager()?;
///
/// let scenes = Engine::scene_manager()?;
/// let events = Engine::event_bus()?.subscribe();
///
/// Engine::shutdown();
/// # Ok::<(), aurora_3d_engine::aurora3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log an error before handing it back to the caller
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("aurora3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("aurora3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("aurora3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine
    ///
    /// Creates the event bus. Idempotent: calling it again keeps the
    /// existing bus and its subscribers.
    pub fn initialize() -> Result<()> {
        let state = ENGINE_STATE.get_or_init(EngineState::new);

        let mut bus = state.event_bus.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("EventBus lock poisoned".to_string())
            ))?;

        if bus.is_none() {
            *bus = Some(Arc::new(EventBus::new()));
            crate::engine_debug!("aurora3d::Engine", "Event bus created");
        }

        Ok(())
    }

    /// Shutdown the engine and drop every singleton
    ///
    /// The scene manager goes first since it publishes into the bus.
    /// `initialize()` must be called again before further use.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut sm) = state.scene_manager.write() {
                *sm = None;
            }
            if let Ok(mut bus) = state.event_bus.write() {
                *bus = None;
            }
        }
    }

    // ===== EVENT BUS API =====

    /// Get the engine event bus
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn event_bus() -> Result<Arc<EventBus>> {
        let state = Self::state()?;

        let lock = state.event_bus.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("EventBus lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("EventBus not available. Call Engine::initialize() first.".to_string())
            ))
    }

    // ===== SCENE MANAGER API =====

    /// Create and register the scene manager singleton
    ///
    /// The scene manager publishes its lifecycle events on the engine bus.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A scene manager already exists
    pub fn create_scene_manager() -> Result<Arc<Mutex<SceneManager>>> {
        let bus = Self::event_bus()?;
        let state = Self::state()?;

        let mut lock = state.scene_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("SceneManager lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("SceneManager already exists. Call Engine::destroy_scene_manager() first.".to_string())
            ));
        }

        let manager = Arc::new(Mutex::new(SceneManager::new(bus)));
        *lock = Some(Arc::clone(&manager));

        crate::engine_info!("aurora3d::Engine", "SceneManager singleton created successfully");

        Ok(manager)
    }

    /// Get the scene manager singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - The scene manager has not been created
    pub fn scene_manager() -> Result<Arc<Mutex<SceneManager>>> {
        let state = Self::state()?;

        let lock = state.scene_manager.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("SceneManager lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("SceneManager not created. Call Engine::create_scene_manager() first.".to_string())
            ))
    }

    /// Destroy the scene manager singleton
    ///
    /// Existing references stay valid until dropped.
    pub fn destroy_scene_manager() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.scene_manager.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("SceneManager lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("aurora3d::Engine", "SceneManager singleton destroyed");

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        Self::shutdown();
    }

    // ===== LOGGING API =====

    /// Replace the default logger with a custom implementation
    ///
    /// ```no_run
    /// use aurora_3d_engine::aurora3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Internal logging method with file:line information (for ERROR logs)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
