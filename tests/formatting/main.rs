mod composition;
mod golden;
