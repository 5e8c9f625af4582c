// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
pub mod api;
pub mod auth;
pub mod board;
pub mod dashboard;
pub mod error;
pub mod login;
pub mod optimistic;
pub mod palette;
pub mod render;
