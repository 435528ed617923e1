//! User-facing banner texts.

pub const NETWORK_ERROR: &str = "Network error. Please try again.";

// Booking wizard
pub const FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const BOOKING_SUCCESS: &str = "Appointment booked successfully!";
pub const BOOKING_FAILED: &str = "Could not complete the booking.";
pub const AVAILABILITY_FAILED: &str = "Could not load available times.";
pub const ESTABLISHMENT_NOT_FOUND: &str = "Establishment not found.";

// Auth
pub const LOGIN_SUCCESS: &str = "Logged in successfully!";
pub const LOGIN_FAILED: &str = "Could not log in.";
pub const REGISTER_SUCCESS: &str = "Registration complete. Log in to continue.";
pub const REGISTER_FAILED: &str = "Could not register.";

// Dashboard
pub const PROFILE_LOAD_FAILED: &str = "Could not load the establishment profile.";
pub const PROFILE_SAVED: &str = "Profile updated successfully!";
pub const PROFILE_SAVE_FAILED: &str = "Could not update the profile.";
pub const EMPLOYEE_ADDED: &str = "Employee added successfully!";
pub const EMPLOYEE_ADD_FAILED: &str = "Could not add the employee.";
pub const EMPLOYEE_REMOVE_PROMPT: &str = "Are you sure you want to remove this employee?";
pub const EMPLOYEE_REMOVED: &str = "Employee removed successfully!";
pub const EMPLOYEE_REMOVE_FAILED: &str = "Could not remove the employee.";
pub const AVAILABILITY_SAVED: &str = "Availability updated successfully!";
pub const AVAILABILITY_SAVE_FAILED: &str = "Could not update availability.";
pub const SERVICE_ADDED: &str = "Service added successfully!";
pub const SERVICE_ADD_FAILED: &str = "Could not add the service.";
pub const SERVICE_REMOVE_PROMPT: &str = "Are you sure you want to remove this service?";
pub const SERVICE_REMOVED: &str = "Service removed successfully!";
pub const SERVICE_REMOVE_FAILED: &str = "Could not remove the service.";
pub const STATUS_UPDATED: &str = "Appointment status updated!";
pub const STATUS_UPDATE_FAILED: &str = "Could not update the appointment status.";
pub const LIST_LOAD_FAILED: &str = "Could not load this list.";
