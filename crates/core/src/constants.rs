//! Constants shared across the admin client.

/// Default base URL of the REST backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/";

/// Default application name. Prefixes event names, alert headers and page titles.
pub const DEFAULT_APP_NAME: &str = "hospitalManagementApp";

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Path prefix of every REST resource, relative to the base URL.
pub const API_PREFIX: &str = "api";

/// Name of the abstract state every entity state hangs off.
pub const ENTITY_ROOT_STATE: &str = "entity";

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
pub const LINK_HEADER: &str = "link";
