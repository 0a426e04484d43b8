pub mod products;

use std::sync::Arc;

use catalog_db::Database;
use catalog_kernel::ModuleRegistry;

/// Register all application modules, wiring them to `database`
pub fn register_all(registry: &mut ModuleRegistry, database: &Database) {
    let store = Arc::new(products::store::MongoProductStore::new(database));
    registry.register(products::create_module(store));
}
