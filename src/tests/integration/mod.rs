//! End-to-End Flows
