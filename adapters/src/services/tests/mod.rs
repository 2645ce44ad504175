//! Tests for transport services against local servers
