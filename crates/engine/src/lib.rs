//! Budget tracking engine.
//!
//! The engine validates transactions and budget updates before they reach
//! storage, sequences writes against a [`Gateway`], and turns a user's
//! transaction history into reports and warnings.
//!
//! ```no_run
//! # async fn demo() -> Result<(), engine::EngineError> {
//! use engine::{Engine, NewUser, TransactionDraft};
//!
//! let engine = Engine::builder().build();
//! let user = engine
//!     .add_user(NewUser::new("alice", "alice@example.com", 100.0))
//!     .await?;
//! engine
//!     .create_transaction(&TransactionDraft::new(user.id, "Lunch", 12.5, "FOOD"))
//!     .await?;
//! let report = engine.budget_report(user.id).await?;
//! assert_eq!(report.total_spent, 12.5);
//! # Ok(())
//! # }
//! ```

pub use categories::Category;
pub use error::{EngineError, ErrorKind};
pub use gateway::{Gateway, GatewayError, GatewayResult, MemoryGateway, SqlGateway};
pub use ops::{Engine, EngineBuilder};
pub use report::{BudgetReport, SummaryEntry};
pub use transactions::{InsertedTransaction, Transaction};
pub use users::{NewUser, User};
pub use validation::{BudgetPatch, TransactionDraft, TransactionPatch, UserPatch};

pub mod analytics;
mod categories;
mod error;
pub mod gateway;
mod ops;
mod report;
pub mod transactions;
pub mod users;
pub mod validation;

type ResultEngine<T> = Result<T, EngineError>;
