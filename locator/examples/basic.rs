//! Basic example of the Locator container.

use std::sync::Arc;

use locator::prelude::*;
use tracing::info;

// === Define your services ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserService {
    db: Arc<Database>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

/// Registers the infrastructure layer.
fn infrastructure(c: Arc<Container>, Arg(url): Arg<String>) -> Result<()> {
    c.add("database.url", url)?
        .add_shared("logger", || -> Result<Arc<dyn Logger>> {
            Ok(Arc::new(ConsoleLogger))
        })?
        .add_shared("database", |c: Arc<Container>| -> Result<Arc<Database>> {
            let logger = c.call("logger", args![])?;
            let logger = logger
                .downcast_ref::<Arc<dyn Logger>>()
                .cloned()
                .ok_or_else(|| LocatorError::failed("logger has an unexpected type"))?;
            Ok(Arc::new(Database {
                url: (*c.resolve::<String>("database.url")?).clone(),
                logger,
            }))
        })?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("locator_container=debug")
        .init();

    // Application container: infrastructure lives here.
    let app = Container::new();
    app.register(infrastructure, args![String::from("postgres://localhost/myapp")])?;
    info!(entries = app.len(), "Application container ready");

    // Request container: defers to the application container for everything it has.
    let request = Container::with_master(app.clone());
    request.add_factory("users", |c: Arc<Container>| -> Result<UserService> {
        let db = c.call("database", args![])?;
        let db = db
            .downcast_ref::<Arc<Database>>()
            .cloned()
            .ok_or_else(|| LocatorError::failed("database has an unexpected type"))?;
        Ok(UserService { db })
    })?;

    let users = request.call("users", args![])?;
    if let Some(service) = users.downcast_ref::<UserService>() {
        println!("{}", service.get_user(42));
    }

    // The master owns "database.url"; a local override is refused.
    if let Err(err) = request.add("database.url", String::from("sqlite://memory")) {
        println!("{err}");
    }

    println!("{request:?}");
    Ok(())
}
