pub mod allocation_site;
