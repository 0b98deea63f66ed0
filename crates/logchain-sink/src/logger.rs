use crate::{ConsoleTransport, FileTransport, MemoryTransport};
use logchain_core::{
    LevelTable, Listener, LogRecord, LoggingEvent, Result, Sink, SinkConfig, SinkError,
    SinkFactory, SubscriptionId, Transport, TransportOptions,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

/// A transport together with its per-attachment options
struct Slot {
    transport: Box<dyn Transport>,
    level: Option<String>,
}

impl Slot {
    /// Threshold in effect: option override, then transport level, then the default
    fn threshold<'a>(&'a self, default: &'a str) -> &'a str {
        self.level
            .as_deref()
            .or_else(|| self.transport.level())
            .unwrap_or(default)
    }
}

/// Level-gated logger that routes records to its transports
///
/// Emits a `LoggingEvent` to every subscriber for each transport that
/// accepted a record.
pub struct Logger {
    tag: String,
    default_level: String,
    levels: RwLock<LevelTable>,
    transports: Mutex<Vec<Slot>>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl Logger {
    /// Create a logger with no transports
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            default_level: "info".to_string(),
            levels: RwLock::new(LevelTable::default()),
            transports: Mutex::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Create a logger and its transports from configuration
    ///
    /// Without any transport section the logger gets a console transport at
    /// the default level.
    pub fn from_config(tag: impl Into<String>, config: &SinkConfig) -> Result<Self> {
        let levels = config.levels.clone().unwrap_or_default();
        if !levels.contains(&config.level) {
            return Err(SinkError::Config(format!(
                "default level '{}' is not a known level",
                config.level
            )));
        }

        let logger = Self {
            default_level: config.level.clone(),
            levels: RwLock::new(levels),
            ..Self::new(tag)
        };

        if let Some(ref console) = config.console {
            logger.add_transport(
                Box::new(ConsoleTransport::with_config(console.clone())),
                TransportOptions::default(),
            )?;
        }

        if let Some(ref file) = config.file {
            let transport = FileTransport::new(file.clone()).map_err(|e| SinkError::Transport {
                transport: "file".to_string(),
                source: e,
            })?;
            logger.add_transport(Box::new(transport), TransportOptions::default())?;
        }

        if let Some(ref memory) = config.memory {
            logger.add_transport(
                Box::new(MemoryTransport::with_config(memory.clone())),
                TransportOptions::default(),
            )?;
        }

        if !config.has_transports() {
            logger.add_transport(Box::new(ConsoleTransport::new()), TransportOptions::default())?;
        }

        Ok(logger)
    }

    /// Level used by transports that don't set their own
    pub fn default_level(&self) -> &str {
        &self.default_level
    }

    fn level_table(&self) -> LevelTable {
        self.levels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_level(&self, levels: &LevelTable, level: &str) -> Result<()> {
        if levels.contains(level) {
            Ok(())
        } else {
            Err(SinkError::UnknownLevel {
                tag: self.tag.clone(),
                level: level.to_string(),
            })
        }
    }

    /// Notify every subscriber; listeners run without any lock held
    fn emit(&self, event: &LoggingEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

impl Sink for Logger {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn levels(&self) -> LevelTable {
        self.level_table()
    }

    fn set_levels(&self, levels: LevelTable) {
        debug!(tag = %self.tag, levels = ?levels.names(), "Replacing level table");
        *self.levels.write().unwrap_or_else(PoisonError::into_inner) = levels;
    }

    fn log(&self, record: &LogRecord) -> Result<()> {
        let levels = self.level_table();
        self.check_level(&levels, &record.level)?;

        let mut accepted = Vec::new();
        let mut failure = None;
        {
            let mut transports = self.transports.lock().unwrap_or_else(PoisonError::into_inner);
            for slot in transports.iter_mut() {
                if !levels.accepts(slot.threshold(&self.default_level), &record.level) {
                    continue;
                }

                let name = slot.transport.name().to_string();
                match slot.transport.write(record) {
                    Ok(()) => accepted.push(name),
                    Err(e) => {
                        warn!(tag = %self.tag, transport = %name, error = %e, "Transport write failed");
                        if failure.is_none() {
                            failure = Some(SinkError::Transport {
                                transport: name,
                                source: e,
                            });
                        }
                    }
                }
            }
        }

        for transport in accepted {
            self.emit(&LoggingEvent::new(&self.tag, transport, record));
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn add_transport(&self, transport: Box<dyn Transport>, options: TransportOptions) -> Result<()> {
        let levels = self.level_table();
        if let Some(level) = options.level.as_deref().or_else(|| transport.level()) {
            self.check_level(&levels, level)?;
        }

        let mut transports = self.transports.lock().unwrap_or_else(PoisonError::into_inner);
        let name = transport.name().to_string();
        if transports.iter().any(|slot| slot.transport.name() == name) {
            return Err(SinkError::TransportExists(name));
        }

        debug!(tag = %self.tag, transport = %name, "Added transport");
        transports.push(Slot {
            transport,
            level: options.level,
        });
        Ok(())
    }

    fn remove_transport(&self, name: &str) -> Result<()> {
        let mut transports = self.transports.lock().unwrap_or_else(PoisonError::into_inner);
        let index = transports
            .iter()
            .position(|slot| slot.transport.name() == name)
            .ok_or_else(|| SinkError::TransportNotFound(name.to_string()))?;

        let mut slot = transports.remove(index);
        if let Err(e) = slot.transport.flush() {
            warn!(tag = %self.tag, transport = %name, error = %e, "Flush on removal failed");
        }
        debug!(tag = %self.tag, transport = %name, "Removed transport");
        Ok(())
    }

    /// Flush every transport, returning the first failure
    fn flush(&self) -> Result<()> {
        let mut transports = self.transports.lock().unwrap_or_else(PoisonError::into_inner);
        for slot in transports.iter_mut() {
            slot.transport.flush().map_err(|e| SinkError::Transport {
                transport: slot.transport.name().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn transports(&self) -> Vec<String> {
        self.transports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|slot| slot.transport.name().to_string())
            .collect()
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

/// Builds a `Logger` for every new node
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerFactory;

impl SinkFactory for LoggerFactory {
    fn create(&self, tag: &str, config: &SinkConfig) -> Result<Arc<dyn Sink>> {
        let logger = Logger::from_config(tag, config)?;
        Ok(Arc::new(logger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logchain_core::{FileConfig, MemoryConfig, TransportError};

    fn memory_logger(level: &str) -> (Logger, crate::MemoryBuffer) {
        let logger = Logger::new("test");
        let transport = MemoryTransport::new().with_level(level);
        let buffer = transport.buffer();
        logger
            .add_transport(Box::new(transport), TransportOptions::default())
            .unwrap();
        (logger, buffer)
    }

    fn collect_events(logger: &Logger) -> Arc<Mutex<Vec<LoggingEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        logger.subscribe(Arc::new(move |event: &LoggingEvent| {
            sink.lock().unwrap().push(event.clone());
        }));
        events
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn name(&self) -> &str {
            "failing"
        }

        fn write(&mut self, _record: &LogRecord) -> std::result::Result<(), TransportError> {
            Err(TransportError::File("disk full".to_string()))
        }
    }

    #[test]
    fn test_level_filtering() {
        let (logger, buffer) = memory_logger("warn");
        logger.log(&LogRecord::new("error", "kept")).unwrap();
        logger.log(&LogRecord::new("info", "dropped")).unwrap();

        assert_eq!(buffer.messages(), vec![("error".to_string(), "kept".to_string())]);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let (logger, buffer) = memory_logger("silly");
        let err = logger.log(&LogRecord::new("notice", "x")).unwrap_err();
        assert!(matches!(err, SinkError::UnknownLevel { ref level, .. } if level == "notice"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_logging_event_per_accepting_transport() {
        let logger = Logger::new("multi");
        logger
            .add_transport(Box::new(MemoryTransport::named("a")), TransportOptions::level("error"))
            .unwrap();
        logger
            .add_transport(Box::new(MemoryTransport::named("b")), TransportOptions::level("debug"))
            .unwrap();
        let events = collect_events(&logger);

        logger.log(&LogRecord::new("info", "hello")).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transport, "b");
        assert_eq!(events[0].tag, "multi");
        assert_eq!(events[0].message, "hello");
    }

    #[test]
    fn test_option_level_overrides_transport_level() {
        let logger = Logger::new("override");
        let transport = MemoryTransport::new().with_level("error");
        let buffer = transport.buffer();
        logger
            .add_transport(Box::new(transport), TransportOptions::level("debug"))
            .unwrap();

        logger.log(&LogRecord::new("debug", "visible")).unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_default_level_applies_without_transport_level() {
        let logger = Logger::new("defaults");
        let transport = MemoryTransport::new();
        let buffer = transport.buffer();
        logger
            .add_transport(Box::new(transport), TransportOptions::default())
            .unwrap();

        logger.log(&LogRecord::new("info", "yes")).unwrap();
        logger.log(&LogRecord::new("debug", "no")).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(logger.default_level(), "info");
    }

    #[test]
    fn test_duplicate_transport_rejected() {
        let logger = Logger::new("dup");
        logger
            .add_transport(Box::new(MemoryTransport::new()), TransportOptions::default())
            .unwrap();
        let err = logger
            .add_transport(Box::new(MemoryTransport::new()), TransportOptions::default())
            .unwrap_err();
        assert!(matches!(err, SinkError::TransportExists(ref name) if name == "memory"));
    }

    #[test]
    fn test_remove_transport() {
        let (logger, buffer) = memory_logger("info");
        logger.remove_transport("memory").unwrap();
        assert!(logger.transports().is_empty());

        logger.log(&LogRecord::new("error", "nowhere")).unwrap();
        assert!(buffer.is_empty());

        let err = logger.remove_transport("memory").unwrap_err();
        assert!(matches!(err, SinkError::TransportNotFound(_)));
    }

    #[test]
    fn test_failing_transport_does_not_block_others() {
        let logger = Logger::new("partial");
        logger
            .add_transport(Box::new(FailingTransport), TransportOptions::default())
            .unwrap();
        let transport = MemoryTransport::new();
        let buffer = transport.buffer();
        logger
            .add_transport(Box::new(transport), TransportOptions::default())
            .unwrap();
        let events = collect_events(&logger);

        let err = logger.log(&LogRecord::new("info", "still here")).unwrap_err();
        assert!(matches!(err, SinkError::Transport { ref transport, .. } if transport == "failing"));
        assert_eq!(buffer.len(), 1);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_set_levels_replaces_table() {
        let (logger, buffer) = memory_logger("info");
        logger.set_levels(LevelTable::new([("fatal", 0), ("info", 1)]));

        assert!(logger.levels().contains("fatal"));
        assert!(!logger.levels().contains("warn"));
        assert!(logger.log(&LogRecord::new("warn", "gone")).is_err());
        logger.log(&LogRecord::new("fatal", "kept")).unwrap();
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let (logger, _buffer) = memory_logger("info");
        let id = logger.subscribe(Arc::new(|_: &LoggingEvent| {}));
        assert!(logger.unsubscribe(id));
        assert!(!logger.unsubscribe(id));
    }

    #[test]
    fn test_flush_reaches_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("buffered.log");
        let config = SinkConfig::default().with_file(FileConfig {
            json: false,
            timestamp: false,
            ..FileConfig::new(path.to_string_lossy().to_string())
        });
        let logger = Logger::from_config("buffered", &config).unwrap();

        logger.log(&LogRecord::new("info", "pending")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        logger.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "info: pending\n");
    }

    #[test]
    fn test_remove_transport_flushes_it() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("removed.log");
        let config = SinkConfig::default().with_file(FileConfig {
            json: false,
            timestamp: false,
            ..FileConfig::new(path.to_string_lossy().to_string())
        });
        let logger = Logger::from_config("removed", &config).unwrap();

        logger.log(&LogRecord::new("warn", "last words")).unwrap();
        logger.remove_transport("file").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "warn: last words\n");
    }

    #[test]
    fn test_from_config_without_transports_uses_console() {
        let logger = Logger::from_config("plain", &SinkConfig::default()).unwrap();
        assert_eq!(logger.transports(), vec!["console".to_string()]);
    }

    #[test]
    fn test_from_config_builds_configured_transports() {
        let config = SinkConfig::default()
            .with_level("debug")
            .with_memory(MemoryConfig::at_level("error"));
        let logger = Logger::from_config("configured", &config).unwrap();
        assert_eq!(logger.transports(), vec!["memory".to_string()]);
        assert_eq!(logger.default_level(), "debug");
    }

    #[test]
    fn test_from_config_rejects_unknown_default_level() {
        let config = SinkConfig::default().with_level("loud");
        assert!(matches!(
            Logger::from_config("bad", &config),
            Err(SinkError::Config(_))
        ));
    }

    #[test]
    fn test_add_transport_rejects_unknown_level() {
        let logger = Logger::new("strict");
        let err = logger
            .add_transport(Box::new(MemoryTransport::new()), TransportOptions::level("loud"))
            .unwrap_err();
        assert!(matches!(err, SinkError::UnknownLevel { .. }));
    }

    #[test]
    fn test_factory_creates_logger() {
        let sink = LoggerFactory
            .create("made", &SinkConfig::default().with_memory(MemoryConfig::default()))
            .unwrap();
        assert_eq!(sink.tag(), "made");
        assert_eq!(sink.transports(), vec!["memory".to_string()]);
    }
}
